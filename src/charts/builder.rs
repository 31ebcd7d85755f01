//! Chart Builder Module
//! Pure constructors turning a selected neighborhood or the filtered view
//! into chart specifications (or a textual notice when data is missing).

use crate::data::{DataProcessor, NeighborhoodRecord, ProcessorError};
use polars::prelude::*;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Pie,
    Bar,
}

/// Declarative chart handed to the plotter.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    /// Stable identity for the plot widget.
    pub id: String,
    pub kind: ChartKind,
    pub title: Option<String>,
    pub x_label: String,
    pub y_label: String,
    pub categories: Vec<String>,
    pub values: Vec<f64>,
}

impl ChartSpec {
    fn new(id: &str, kind: ChartKind) -> Self {
        Self {
            id: id.to_string(),
            kind,
            title: None,
            x_label: String::new(),
            y_label: String::new(),
            categories: Vec::new(),
            values: Vec::new(),
        }
    }

    fn titled(mut self, title: String) -> Self {
        self.title = Some(title);
        self
    }

    fn labels(mut self, x: &str, y: &str) -> Self {
        self.x_label = x.to_string();
        self.y_label = y.to_string();
        self
    }

    fn points(mut self, points: Vec<(String, f64)>) -> Self {
        let (categories, values): (Vec<String>, Vec<f64>) = points.into_iter().unzip();
        self.categories = categories;
        self.values = values;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PanelBody {
    Chart(ChartSpec),
    Notice(String),
}

/// One dashboard section: heading, chart or notice, optional caption below.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartPanel {
    pub heading: String,
    pub body: PanelBody,
    pub caption: Option<String>,
}

impl ChartPanel {
    pub fn chart(&self) -> Option<&ChartSpec> {
        match &self.body {
            PanelBody::Chart(spec) => Some(spec),
            PanelBody::Notice(_) => None,
        }
    }
}

/// Column names the comparison charts read.
pub struct ComparisonColumns<'a> {
    pub name: &'a str,
    pub metric: &'a str,
}

/// Builds the seven dashboard charts.
pub struct ChartBuilder;

impl ChartBuilder {
    /// Values for `(label, column)` pairs of a record, skipping missing ones.
    fn record_points(record: &NeighborhoodRecord, pairs: &[(&str, &str)]) -> Vec<(String, f64)> {
        pairs
            .iter()
            .filter_map(|(label, column)| match record.number(column) {
                Some(v) => Some((label.to_string(), v)),
                None => {
                    debug!(column, neighborhood = %record.name, "no numeric value, skipping");
                    None
                }
            })
            .collect()
    }

    fn group_points(record: &NeighborhoodRecord, columns: &[String]) -> Vec<(String, f64)> {
        let pairs: Vec<(&str, &str)> = columns.iter().map(|c| (c.as_str(), c.as_str())).collect();
        Self::record_points(record, &pairs)
    }

    /// Men/women pie with the resident total as caption.
    pub fn sex_pie(record: &NeighborhoodRecord) -> ChartPanel {
        let spec = ChartSpec::new("sexo", ChartKind::Pie)
            .titled(format!(
                "Distribuição de Homens e Mulheres no Bairro: {}",
                record.name
            ))
            .points(Self::record_points(
                record,
                &[("Homens", "POP_TOTAL_HOMEM"), ("Mulheres", "POP_TOTAL_MULHER")],
            ));

        ChartPanel {
            heading: "Gráfico de Pizza: Distribuição entre Homens e Mulheres".to_string(),
            body: PanelBody::Chart(spec),
            caption: Some(format!(
                "População Total de Residentes no Bairro {}: {}",
                record.name,
                record.text("POP_TOTAL_RESIDENTE")
            )),
        }
    }

    /// Three age brackets with the ageing index as caption.
    pub fn age_bar(record: &NeighborhoodRecord) -> ChartPanel {
        let spec = ChartSpec::new("faixa_etaria", ChartKind::Bar)
            .titled(format!("Distribuição Etária no Bairro: {}", record.name))
            .labels("Faixa Etária", "População")
            .points(Self::record_points(
                record,
                &[
                    ("0-6 Anos", "IDADE_0_6_ANOS"),
                    ("7-14 Anos", "IDADE_7_14_ANOS"),
                    ("65+ Anos", "IDADE_65_MAIS"),
                ],
            ));

        ChartPanel {
            heading: "Gráfico de Barras: Distribuição por Faixa Etária".to_string(),
            body: PanelBody::Chart(spec),
            caption: Some(format!(
                "Grau de Envelhecimento no Bairro {}: {}",
                record.name,
                record.text("GRAU_ENVELHECIMENTO")
            )),
        }
    }

    pub fn race_pie(record: &NeighborhoodRecord, columns: &[String]) -> ChartPanel {
        let heading = "Gráfico de Pizza: População dividida por Cor no Bairro".to_string();
        if columns.is_empty() {
            return ChartPanel {
                heading,
                body: PanelBody::Notice(
                    "Não há dados de cor disponíveis para o bairro selecionado.".to_string(),
                ),
                caption: None,
            };
        }

        let spec = ChartSpec::new("cor", ChartKind::Pie)
            .titled(format!("Distribuição por Cor no Bairro: {}", record.name))
            .points(Self::group_points(record, columns));
        ChartPanel {
            heading,
            body: PanelBody::Chart(spec),
            caption: None,
        }
    }

    pub fn household_bar(record: &NeighborhoodRecord, columns: &[String]) -> ChartPanel {
        let heading = "Gráfico de Barras: Total de Domicílios, Lixo coletado, Saneamento adequado e Rede de água por Bairro".to_string();
        if columns.is_empty() {
            return ChartPanel {
                heading,
                body: PanelBody::Notice(
                    "Não há dados de DOM disponíveis para o bairro selecionado.".to_string(),
                ),
                caption: None,
            };
        }

        let spec = ChartSpec::new("domicilios", ChartKind::Bar)
            .titled(format!("Dados dos Domicílios no Bairro: {}", record.name))
            .labels("Tipo de Domínio", "Valor")
            .points(Self::group_points(record, columns));
        ChartPanel {
            heading,
            body: PanelBody::Chart(spec),
            caption: None,
        }
    }

    /// Coverage proportions. Percentage strings are plotted by their number.
    pub fn coverage_bar(record: &NeighborhoodRecord, columns: &[String]) -> ChartPanel {
        let heading = "Gráfico de Barras: Proporção de Cobertura por Domicílio".to_string();
        if columns.is_empty() {
            return ChartPanel {
                heading,
                body: PanelBody::Notice(
                    "Não há dados de PROP_ disponíveis para o bairro selecionado.".to_string(),
                ),
                caption: None,
            };
        }

        let spec = ChartSpec::new("proporcoes", ChartKind::Bar)
            .titled(format!(
                "Proporção entre Lixo Coletado, Saneamento adequado e Rede de água por Domicílio: {}",
                record.name
            ))
            .labels("Tipo de Proporção", "Valor (%)")
            .points(Self::group_points(record, columns));
        ChartPanel {
            heading,
            body: PanelBody::Chart(spec),
            caption: None,
        }
    }

    /// One bar per neighborhood of the (filtered, sorted) view.
    fn comparison_bar(
        view: &DataFrame,
        id: &str,
        columns: &ComparisonColumns<'_>,
        heading: &str,
        y_label: &str,
        notice: &str,
    ) -> Result<ChartPanel, ProcessorError> {
        if !DataProcessor::has_column(view, columns.metric) {
            return Ok(ChartPanel {
                heading: heading.to_string(),
                body: PanelBody::Notice(notice.to_string()),
                caption: None,
            });
        }

        let names = DataProcessor::column_keys(view, columns.name)?;
        let values = DataProcessor::numeric_values(view, columns.metric)?;
        let points = names
            .into_iter()
            .zip(values)
            .filter_map(|(name, value)| value.map(|v| (name, v)))
            .collect();

        let spec = ChartSpec::new(id, ChartKind::Bar)
            .labels("Bairro", y_label)
            .points(points);
        Ok(ChartPanel {
            heading: heading.to_string(),
            body: PanelBody::Chart(spec),
            caption: None,
        })
    }

    pub fn density_bar(
        view: &DataFrame,
        columns: &ComparisonColumns<'_>,
    ) -> Result<ChartPanel, ProcessorError> {
        Self::comparison_bar(
            view,
            "densidade",
            columns,
            "Gráfico de Barras: Comparação da Densidade Populacional entre Todos os Bairros",
            "Densidade Populacional",
            "Não há dados de densidade disponíveis na planilha.",
        )
    }

    pub fn income_bar(
        view: &DataFrame,
        columns: &ComparisonColumns<'_>,
    ) -> Result<ChartPanel, ProcessorError> {
        Self::comparison_bar(
            view,
            "renda",
            columns,
            "Gráfico de Barras: Média de Renda entre Bairros",
            "Média de Renda (R$)",
            "Não há dados de renda disponíveis na planilha.",
        )
    }

    pub fn illiteracy_bar(
        view: &DataFrame,
        columns: &ComparisonColumns<'_>,
    ) -> Result<ChartPanel, ProcessorError> {
        Self::comparison_bar(
            view,
            "analfabetismo",
            columns,
            "Gráfico de Barras: Taxa de Analfabetismo por Bairro",
            "Taxa de Analfabetismo (%)",
            "Não há dados de analfabetismo disponíveis na planilha.",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::CellValue;

    fn centro() -> NeighborhoodRecord {
        NeighborhoodRecord {
            name: "Centro".to_string(),
            fields: vec![
                ("NOME_BAIRRO".to_string(), CellValue::Text("Centro".into())),
                ("POP_TOTAL_HOMEM".to_string(), CellValue::Int(100)),
                ("POP_TOTAL_MULHER".to_string(), CellValue::Int(120)),
                ("POP_TOTAL_RESIDENTE".to_string(), CellValue::Int(220)),
                ("IDADE_0_6_ANOS".to_string(), CellValue::Int(15)),
                ("IDADE_7_14_ANOS".to_string(), CellValue::Int(25)),
                ("IDADE_65_MAIS".to_string(), CellValue::Int(30)),
                ("GRAU_ENVELHECIMENTO".to_string(), CellValue::Float(75.5)),
                ("DOM_TOTAL".to_string(), CellValue::Int(80)),
                ("PROP_LIXO/DOM".to_string(), CellValue::Text("87.50%".into())),
            ],
        }
    }

    #[test]
    fn sex_pie_scenario() {
        let panel = ChartBuilder::sex_pie(&centro());
        let spec = panel.chart().unwrap();

        assert_eq!(spec.kind, ChartKind::Pie);
        assert_eq!(spec.categories, vec!["Homens", "Mulheres"]);
        assert_eq!(spec.values, vec![100.0, 120.0]);
        assert!(spec.title.as_deref().unwrap().contains("Centro"));
        assert_eq!(
            panel.caption.as_deref(),
            Some("População Total de Residentes no Bairro Centro: 220")
        );
    }

    #[test]
    fn age_bar_has_three_brackets() {
        let panel = ChartBuilder::age_bar(&centro());
        let spec = panel.chart().unwrap();

        assert_eq!(spec.kind, ChartKind::Bar);
        assert_eq!(spec.categories, vec!["0-6 Anos", "7-14 Anos", "65+ Anos"]);
        assert_eq!(spec.values, vec![15.0, 25.0, 30.0]);
        assert_eq!(
            panel.caption.as_deref(),
            Some("Grau de Envelhecimento no Bairro Centro: 75.5")
        );
    }

    #[test]
    fn race_pie_without_columns_is_notice() {
        let panel = ChartBuilder::race_pie(&centro(), &[]);
        assert!(panel.chart().is_none());
        assert!(matches!(panel.body, PanelBody::Notice(ref text) if text.contains("cor")));
    }

    #[test]
    fn group_charts_use_discovered_columns() {
        let record = centro();
        let household = ChartBuilder::household_bar(&record, &["DOM_TOTAL".to_string()]);
        assert_eq!(household.chart().unwrap().categories, vec!["DOM_TOTAL"]);

        let coverage = ChartBuilder::coverage_bar(&record, &["PROP_LIXO/DOM".to_string()]);
        assert_eq!(coverage.chart().unwrap().values, vec![87.5]);
    }

    #[test]
    fn comparison_follows_view_order_and_guards_absent_metric() {
        let view = DataFrame::new(vec![
            Column::new("NOME_BAIRRO".into(), ["Meireles", "Centro"]),
            Column::new("DENSIDADE".into(), [300.0, 1500.0]),
        ])
        .unwrap();

        let density = ChartBuilder::density_bar(
            &view,
            &ComparisonColumns {
                name: "NOME_BAIRRO",
                metric: "DENSIDADE",
            },
        )
        .unwrap();
        let spec = density.chart().unwrap();
        assert_eq!(spec.categories, vec!["Meireles", "Centro"]);
        assert_eq!(spec.values, vec![300.0, 1500.0]);
        assert_eq!(spec.x_label, "Bairro");

        let illiteracy = ChartBuilder::illiteracy_bar(
            &view,
            &ComparisonColumns {
                name: "NOME_BAIRRO",
                metric: "EDUC_ANALFABETISMO",
            },
        )
        .unwrap();
        assert!(illiteracy.chart().is_none());
    }
}
