//! TUI application state.
//!
//! Navigation model: a sidebar with the fixed pages and the sections of
//! the active page, and a content area showing the selected section's
//! SQL and result. A chart panel can replace the result view for the
//! selected section. Activating a page re-runs its whole catalogue;
//! results are never cached across views.

use std::path::PathBuf;

use crate::catalog::Catalog;
use crate::chart::{ChartData, ChartError, ChartKind, ChartSpec};
use crate::export;
use crate::report::{run_page, SectionResult};
use crate::store::QueryStore;
use crate::table::ResultTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Pages,
    Sections,
    Results,
}

pub struct ChartState {
    pub kind: ChartKind,
    pub x_index: usize,
    pub y_index: usize,
}

pub struct App {
    store: Box<dyn QueryStore>,
    pub catalog: Catalog,
    pub backend_label: String,
    pub export_dir: PathBuf,

    /// Page highlighted in the sidebar; may differ from the loaded one
    /// until Enter activates it.
    pub page_cursor: usize,
    /// Page whose sections are currently loaded.
    pub active_page: usize,
    pub sections: Vec<SectionResult>,
    pub selected_section: usize,

    pub focus: Focus,
    pub result_scroll: usize,
    pub result_horizontal_scroll: usize,
    pub chart: Option<ChartState>,
    pub status: Option<String>,
    pub should_quit: bool,
}

impl App {
    pub fn new(store: Box<dyn QueryStore>, catalog: Catalog, export_dir: PathBuf) -> Self {
        let backend_label = store.describe();
        let mut app = Self {
            store,
            catalog,
            backend_label,
            export_dir,
            page_cursor: 0,
            active_page: 0,
            sections: Vec::new(),
            selected_section: 0,
            focus: Focus::Pages,
            result_scroll: 0,
            result_horizontal_scroll: 0,
            chart: None,
            status: None,
            should_quit: false,
        };
        app.load_page(0);
        app
    }

    /// Re-runs every query of the given page against the store.
    pub fn load_page(&mut self, index: usize) {
        let Some(page) = self.catalog.pages.get(index) else {
            return;
        };
        self.sections = run_page(self.store.as_ref(), page);
        self.active_page = index;
        self.page_cursor = index;
        self.selected_section = 0;
        self.reset_view();

        let title = self.catalog.pages[index].title.clone();
        let failed = self.sections.iter().filter(|s| s.is_err()).count();
        self.status = if failed > 0 {
            Some(format!(
                "{} loaded, {} of {} sections failed",
                title,
                failed,
                self.sections.len()
            ))
        } else {
            Some(format!("{} loaded ({} sections)", title, self.sections.len()))
        };
    }

    fn reset_view(&mut self) {
        self.result_scroll = 0;
        self.result_horizontal_scroll = 0;
        self.chart = None;
    }

    pub fn selected_result(&self) -> Option<&ResultTable> {
        self.sections
            .get(self.selected_section)
            .and_then(|s| s.outcome.as_ref().ok())
    }

    pub fn page_cursor_up(&mut self) {
        if self.page_cursor > 0 {
            self.page_cursor -= 1;
        }
    }

    pub fn page_cursor_down(&mut self) {
        if self.page_cursor + 1 < self.catalog.pages.len() {
            self.page_cursor += 1;
        }
    }

    pub fn activate_page(&mut self) {
        self.load_page(self.page_cursor);
    }

    pub fn select_prev_section(&mut self) {
        if self.selected_section > 0 {
            self.selected_section -= 1;
            self.reset_view();
        }
    }

    pub fn select_next_section(&mut self) {
        if self.selected_section + 1 < self.sections.len() {
            self.selected_section += 1;
            self.reset_view();
        }
    }

    pub fn scroll_results_up(&mut self) {
        self.result_scroll = self.result_scroll.saturating_sub(1);
    }

    pub fn scroll_results_down(&mut self) {
        if let Some(table) = self.selected_result() {
            if self.result_scroll < table.row_count().saturating_sub(1) {
                self.result_scroll += 1;
            }
        }
    }

    pub fn scroll_results_left(&mut self) {
        self.result_horizontal_scroll = self.result_horizontal_scroll.saturating_sub(1);
    }

    pub fn scroll_results_right(&mut self) {
        if let Some(table) = self.selected_result() {
            if self.result_horizontal_scroll < table.column_count().saturating_sub(1) {
                self.result_horizontal_scroll += 1;
            }
        }
    }

    pub fn page_up(&mut self) {
        self.result_scroll = self.result_scroll.saturating_sub(10);
    }

    pub fn page_down(&mut self) {
        if let Some(table) = self.selected_result() {
            self.result_scroll =
                (self.result_scroll + 10).min(table.row_count().saturating_sub(1));
        }
    }

    pub fn scroll_to_top(&mut self) {
        self.result_scroll = 0;
    }

    pub fn scroll_to_bottom(&mut self) {
        if let Some(table) = self.selected_result() {
            self.result_scroll = table.row_count().saturating_sub(1);
        }
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Pages => Focus::Sections,
            Focus::Sections => Focus::Results,
            Focus::Results => Focus::Pages,
        };
    }

    /// Opens the chart panel for the selected section, defaulting to the
    /// first column as X and the last as Y.
    pub fn toggle_chart(&mut self) {
        if self.chart.is_some() {
            self.chart = None;
            return;
        }
        let Some(table) = self.selected_result() else {
            self.status = Some("Nothing to chart: section has no result".to_string());
            return;
        };
        let columns = table.column_count();
        if columns == 0 {
            self.status = Some("Nothing to chart: result has no columns".to_string());
            return;
        }
        self.chart = Some(ChartState {
            kind: ChartKind::Bar,
            x_index: 0,
            y_index: columns.saturating_sub(1),
        });
    }

    pub fn cycle_chart_kind(&mut self) {
        if let Some(chart) = self.chart.as_mut() {
            chart.kind = chart.kind.next();
        }
    }

    pub fn cycle_x_binding(&mut self) {
        let columns = self.selected_result().map(|t| t.column_count());
        if let (Some(chart), Some(columns)) = (self.chart.as_mut(), columns) {
            if columns > 0 {
                chart.x_index = (chart.x_index + 1) % columns;
            }
        }
    }

    pub fn cycle_y_binding(&mut self) {
        let columns = self.selected_result().map(|t| t.column_count());
        if let (Some(chart), Some(columns)) = (self.chart.as_mut(), columns) {
            if columns > 0 {
                chart.y_index = (chart.y_index + 1) % columns;
            }
        }
    }

    /// Chart series for the current bindings, or None when the panel is
    /// closed or the section has no result.
    pub fn chart_data(&self) -> Option<Result<ChartData, ChartError>> {
        let chart = self.chart.as_ref()?;
        let table = self.selected_result()?;
        let names = table.column_names();
        let spec = ChartSpec {
            kind: chart.kind,
            x: names.get(chart.x_index)?.to_string(),
            y: names.get(chart.y_index)?.to_string(),
        };
        Some(spec.build(table))
    }

    /// Writes the selected section's result table as CSV into the
    /// export directory.
    pub fn export_selected(&mut self) {
        let Some(section) = self.sections.get(self.selected_section) else {
            return;
        };
        let Ok(table) = &section.outcome else {
            self.status = Some("Cannot export a failed section".to_string());
            return;
        };

        let path = self
            .export_dir
            .join(export::file_name_for(&section.description));
        self.status = match export::write_csv(table, &path) {
            Ok(()) => Some(format!("Exported to {}", path.display())),
            Err(e) => Some(format!("Export failed: {e}")),
        };
    }
}
