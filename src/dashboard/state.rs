//! Widget state carried between renders and the fixed sort menus.

use crate::config::DashboardConfig;

/// Column/value filter chosen in the filter panel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState {
    /// `None` means the first column.
    pub column: Option<String>,
    /// `None` means every distinct value (the initial state).
    pub selected: Option<Vec<String>>,
}

impl FilterState {
    /// Switch filter column; the value picker resets to "all values".
    pub fn set_column(&mut self, column: String) {
        if self.column.as_deref() != Some(column.as_str()) {
            self.column = Some(column);
            self.selected = None;
        }
    }

    /// Toggle one value, materializing the implicit "all" selection first.
    pub fn toggle(&mut self, value: &str, options: &[String]) {
        let selected = self.selected.get_or_insert_with(|| options.to_vec());
        if let Some(pos) = selected.iter().position(|v| v == value) {
            selected.remove(pos);
        } else {
            selected.push(value.to_string());
        }
    }

    pub fn select_all(&mut self) {
        self.selected = None;
    }

    pub fn clear_all(&mut self) {
        self.selected = Some(Vec::new());
    }
}

/// Everything the user can change; the input of `Dashboard::render`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardState {
    pub filter: FilterState,
    pub neighborhood: Option<String>,
    pub density_sort: usize,
    pub income_sort: usize,
    pub illiteracy_sort: usize,
}

/// One menu entry: sort `column`, ascending or not.
#[derive(Debug, Clone, PartialEq)]
pub struct SortOption {
    pub label: String,
    pub column: String,
    pub ascending: bool,
}

/// Name A-Z / Z-A plus one metric ascending / descending.
#[derive(Debug, Clone, PartialEq)]
pub struct SortMenu {
    pub id: &'static str,
    pub options: Vec<SortOption>,
}

impl SortMenu {
    fn with_metric(id: &'static str, name_column: &str, metric_label: &str, metric_column: &str) -> Self {
        let option = |label: String, column: &str, ascending| SortOption {
            label,
            column: column.to_string(),
            ascending,
        };
        Self {
            id,
            options: vec![
                option("Nome do Bairro (A-Z)".to_string(), name_column, true),
                option("Nome do Bairro (Z-A)".to_string(), name_column, false),
                option(format!("{} (Crescente)", metric_label), metric_column, true),
                option(format!("{} (Decrescente)", metric_label), metric_column, false),
            ],
        }
    }

    pub fn density(config: &DashboardConfig) -> Self {
        Self::with_metric("ordem_densidade", &config.name_column, "Densidade", &config.density_column)
    }

    pub fn income(config: &DashboardConfig) -> Self {
        Self::with_metric("ordem_renda", &config.name_column, "Renda Média", &config.income_column)
    }

    pub fn illiteracy(config: &DashboardConfig) -> Self {
        Self::with_metric(
            "ordem_analfabetismo",
            &config.name_column,
            "Educação Analfabeta",
            &config.illiteracy_column,
        )
    }

    /// Entry at `index`, falling back to the first one.
    pub fn option(&self, index: usize) -> (usize, &SortOption) {
        match self.options.get(index) {
            Some(option) => (index, option),
            None => (0, &self.options[0]),
        }
    }

    pub fn labels(&self) -> Vec<String> {
        self.options.iter().map(|o| o.label.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> Vec<String> {
        vec!["Norte".to_string(), "Sul".to_string()]
    }

    #[test]
    fn toggle_from_implicit_all() {
        let mut filter = FilterState::default();
        filter.toggle("Sul", &options());
        assert_eq!(filter.selected, Some(vec!["Norte".to_string()]));

        filter.toggle("Sul", &options());
        assert_eq!(
            filter.selected,
            Some(vec!["Norte".to_string(), "Sul".to_string()])
        );
    }

    #[test]
    fn changing_column_resets_values() {
        let mut filter = FilterState::default();
        filter.set_column("REGIAO".to_string());
        filter.clear_all();
        assert_eq!(filter.selected, Some(Vec::new()));

        filter.set_column("REGIAO".to_string());
        assert_eq!(filter.selected, Some(Vec::new()));

        filter.set_column("DENSIDADE".to_string());
        assert_eq!(filter.selected, None);
    }

    #[test]
    fn sort_menus_have_fixed_entries() {
        let config = DashboardConfig::default();
        let menu = SortMenu::income(&config);

        assert_eq!(
            menu.labels(),
            vec![
                "Nome do Bairro (A-Z)",
                "Nome do Bairro (Z-A)",
                "Renda Média (Crescente)",
                "Renda Média (Decrescente)",
            ]
        );
        let (idx, option) = menu.option(3);
        assert_eq!(idx, 3);
        assert_eq!(option.column, "RESP_RENDA_MEDIA");
        assert!(!option.ascending);

        let (idx, option) = menu.option(42);
        assert_eq!(idx, 0);
        assert_eq!(option.column, "NOME_BAIRRO");
        assert!(option.ascending);
    }
}
