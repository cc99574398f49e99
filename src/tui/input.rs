use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use std::time::Duration;

use super::app::{App, Focus};

pub fn handle_events(app: &mut App) -> std::io::Result<bool> {
    if event::poll(Duration::from_millis(100))? {
        if let Event::Key(key) = event::read()? {
            handle_key_event(app, key);
        }
    }
    Ok(app.should_quit)
}

fn handle_key_event(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') => app.should_quit = true,
            KeyCode::Char('d') => app.page_down(),
            KeyCode::Char('u') => app.page_up(),
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => {
            // Esc closes the chart panel first, then quits
            if app.chart.is_some() {
                app.toggle_chart();
            } else {
                app.should_quit = true;
            }
        }

        KeyCode::Tab => app.toggle_focus(),

        KeyCode::Char('j') | KeyCode::Down => match app.focus {
            Focus::Pages => app.page_cursor_down(),
            Focus::Sections => app.select_next_section(),
            Focus::Results => app.scroll_results_down(),
        },
        KeyCode::Char('k') | KeyCode::Up => match app.focus {
            Focus::Pages => app.page_cursor_up(),
            Focus::Sections => app.select_prev_section(),
            Focus::Results => app.scroll_results_up(),
        },
        KeyCode::Char('h') | KeyCode::Left => {
            if app.focus == Focus::Results {
                app.scroll_results_left();
            }
        }
        KeyCode::Char('l') | KeyCode::Right => {
            if app.focus == Focus::Results {
                app.scroll_results_right();
            }
        }
        KeyCode::Char('g') => {
            if app.focus == Focus::Results {
                app.scroll_to_top();
            }
        }
        KeyCode::Char('G') => {
            if app.focus == Focus::Results {
                app.scroll_to_bottom();
            }
        }
        KeyCode::PageDown => app.page_down(),
        KeyCode::PageUp => app.page_up(),

        // Re-runs the highlighted page's catalogue
        KeyCode::Enter => {
            if app.focus == Focus::Pages {
                app.activate_page();
            }
        }

        // Chart panel
        KeyCode::Char('c') => app.toggle_chart(),
        KeyCode::Char('t') => app.cycle_chart_kind(),
        KeyCode::Char('x') => app.cycle_x_binding(),
        KeyCode::Char('y') => app.cycle_y_binding(),

        // CSV download of the selected result table
        KeyCode::Char('s') => app.export_selected(),

        _ => {}
    }
}
