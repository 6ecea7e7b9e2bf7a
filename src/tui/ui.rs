use crate::api::Transport;
use crate::geo::format_distance;
use crate::notify::Level;
use crate::tui::app::App;
use crate::tui::colors;
use crate::tui::menu::{ActionsMenu, ActiveMenu, FilterField, FiltersMenu, InfoDialog};
use crate::tui::search::cursor_column;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table};
use unicode_width::UnicodeWidthStr;

const HEADER_BG: Color = Color::Rgb(0, 95, 135);

pub fn draw<T: Transport>(frame: &mut Frame, app: &mut App<T>) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Search bar
            Constraint::Min(5),    // Table
            Constraint::Length(1), // Pager
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    draw_search_bar(frame, app, chunks[0]);
    draw_table(frame, app, chunks[1]);
    draw_pager(frame, app, chunks[2]);
    draw_status_bar(frame, app, chunks[3]);

    match &app.active_menu {
        ActiveMenu::None => {}
        ActiveMenu::Actions(actions) => draw_actions_menu(frame, actions, area),
        ActiveMenu::Filters(filters) => draw_filters(frame, filters, area),
        ActiveMenu::Info(info) => draw_info_dialog(frame, info, area),
    }

    draw_toast(frame, app, area);

    // Show cursor in search bar when focused (and no menu is active)
    if matches!(app.active_menu, ActiveMenu::None) && app.search.focused {
        // Border (1) + " \u{1F50D} " (4 display cols)
        let cursor_x =
            chunks[0].x + 1 + 4 + cursor_column(&app.search.query, app.search.cursor_pos);
        frame.set_cursor_position(Position::new(cursor_x, chunks[0].y + 1));
    }
}

fn draw_search_bar<T: Transport>(frame: &mut Frame, app: &App<T>, area: Rect) {
    let border_style = if app.search.focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let title = if app.search.history_pos.is_some() {
        " Search (history) "
    } else {
        " Search "
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(title);

    let search_text = format!(" \u{1F50D} {}", app.search.query);
    let paragraph = Paragraph::new(search_text)
        .block(block)
        .style(Style::default().fg(Color::White));

    frame.render_widget(paragraph, area);
}

fn draw_table<T: Transport>(frame: &mut Frame, app: &mut App<T>, area: Rect) {
    // Area height minus the header row
    let table_inner_height = area.height.saturating_sub(1) as usize;
    app.table.visible_rows = table_inner_height;

    let origin = app.store.filters().coordinates;
    let items = app.store.items();

    if items.is_empty() {
        let message = if app.store.is_loading() {
            "Loading..."
        } else if app.store.last_error().is_some() {
            "Could not load items. Press r to retry."
        } else {
            "No items match these filters."
        };
        let paragraph = Paragraph::new(message)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        let y = area.y + area.height / 2;
        frame.render_widget(paragraph, Rect::new(area.x, y, area.width, 1));
        return;
    }

    let mut header_columns = vec!["Title", "Category", "Condition", "Location"];
    if origin.is_some() {
        header_columns.push("Distance");
    }
    header_columns.extend(["Listed", "Owner"]);

    let header = Row::new(header_columns.iter().map(|name| {
        Cell::from(*name).style(
            Style::default()
                .fg(Color::White)
                .bg(HEADER_BG)
                .add_modifier(Modifier::BOLD),
        )
    }))
    .height(1);

    let now = chrono::Utc::now();
    let start = app.table.scroll_offset;
    let end = (start + table_inner_height).min(items.len());

    let rows: Vec<Row> = items[start..end]
        .iter()
        .enumerate()
        .map(|(visual_idx, item)| {
            let is_selected = app.table.selected == Some(start + visual_idx);

            // Alternating row background
            let bg = if is_selected {
                Color::Rgb(60, 60, 80)
            } else if visual_idx % 2 == 1 {
                Color::Rgb(25, 25, 35)
            } else {
                Color::Reset
            };
            let fg_modifier = if is_selected {
                Modifier::BOLD
            } else {
                Modifier::empty()
            };

            let title = format!("{} {}", colors::icon_for_category(&item.category), item.title);
            let mut cells = vec![
                Cell::from(title)
                    .style(Style::default().fg(Color::White).bg(bg).add_modifier(fg_modifier)),
                Cell::from(item.category.clone()).style(Style::default().fg(Color::Blue).bg(bg)),
                Cell::from(item.condition.clone()).style(
                    Style::default()
                        .fg(colors::color_for_condition(&item.condition))
                        .bg(bg),
                ),
                Cell::from(item.location.clone()).style(Style::default().fg(Color::Gray).bg(bg)),
            ];

            if let Some(origin) = origin {
                let distance = item
                    .distance_from(&origin)
                    .map(format_distance)
                    .unwrap_or_default();
                cells.push(Cell::from(distance).style(Style::default().fg(Color::Green).bg(bg)));
            }

            cells.push(
                Cell::from(crate::format_age(item.created_at, now))
                    .style(Style::default().fg(Color::White).bg(bg)),
            );
            cells.push(
                Cell::from(item.owner_name().to_string()).style(
                    Style::default()
                        .fg(Color::DarkGray)
                        .bg(bg)
                        .add_modifier(Modifier::ITALIC),
                ),
            );

            Row::new(cells)
        })
        .collect();

    let mut widths = vec![
        Constraint::Fill(1),
        Constraint::Length(14),
        Constraint::Length(11),
        Constraint::Length(16),
    ];
    if origin.is_some() {
        widths.push(Constraint::Length(9));
    }
    widths.extend([Constraint::Length(11), Constraint::Length(14)]);

    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::NONE));

    frame.render_widget(table, area);
}

fn draw_pager<T: Transport>(frame: &mut Frame, app: &App<T>, area: Rect) {
    let page = app.store.page();
    let current = page.current_page();

    let dim = Style::default().fg(Color::DarkGray);
    let mut spans = vec![Span::raw(" ")];

    spans.push(Span::styled(
        "\u{2039} ",
        if page.has_previous_page() {
            Style::default().fg(Color::White)
        } else {
            dim
        },
    ));
    for n in page.window(app.config.max_visible_pages) {
        if n == current {
            spans.push(Span::styled(
                format!("[{}]", n),
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ));
        } else {
            spans.push(Span::styled(format!(" {} ", n), Style::default().fg(Color::White)));
        }
    }
    spans.push(Span::styled(
        " \u{203A}",
        if page.has_next_page() {
            Style::default().fg(Color::White)
        } else {
            dim
        },
    ));

    let range = match page.item_range() {
        Some((first, last)) => format!("   Showing {}\u{2013}{} of {}", first, last, page.total()),
        None => "   No results".to_string(),
    };
    spans.push(Span::styled(range, Style::default().fg(Color::Gray)));

    let filters = app.store.filters();
    if filters.is_filtered() {
        spans.push(Span::styled(format!("   {}", filters.summary()), dim));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_status_bar<T: Transport>(frame: &mut Frame, app: &App<T>, area: Rect) {
    let mut left_text = if app.store.is_loading() {
        " \u{23F3} Searching...".to_string()
    } else {
        format!(" {}", app.status_message)
    };
    if let Some(unread) = app.unread {
        left_text.push_str(&format!(" | \u{2709} {} unread", unread));
    }

    let right_text = " Tab:Search  n/p:Page  s:Sort  Ctrl+F:Filters  Enter:Actions  ?:Keys  Ctrl+Q:Quit ";

    // Build the status line: left-aligned text + padding + right-aligned text
    let available_width = area.width as usize;
    let left_len = left_text.width();
    let right_len = right_text.width();

    let status_str = if left_len + right_len < available_width {
        let padding = available_width - left_len - right_len;
        format!("{}{:padding$}{}", left_text, "", right_text, padding = padding)
    } else {
        // Not enough space, just show left text
        left_text
    };

    let status = Paragraph::new(status_str).style(Style::default().fg(Color::White).bg(HEADER_BG));
    frame.render_widget(status, area);
}

fn draw_toast<T: Transport>(frame: &mut Frame, app: &App<T>, area: Rect) {
    let Some(toast) = app.notifications.current() else {
        return;
    };

    let color = match toast.level {
        Level::Info => Color::Cyan,
        Level::Success => Color::Green,
        Level::Warning => Color::Yellow,
        Level::Error => Color::Red,
    };

    let text = format!(" {} ", toast.message);
    let width = (text.width() as u16 + 2).min(area.width.saturating_sub(2));
    let toast_area = Rect::new(
        area.x + area.width.saturating_sub(width + 1),
        area.y + 1,
        width,
        3.min(area.height),
    );

    frame.render_widget(Clear, toast_area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(format!(" {} ", toast.level.label()))
        .title_style(Style::default().fg(color).add_modifier(Modifier::BOLD));
    frame.render_widget(
        Paragraph::new(text)
            .block(block)
            .style(Style::default().fg(Color::White)),
        toast_area,
    );
}

/// Helper to create a centered popup area
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

fn draw_actions_menu(frame: &mut Frame, actions: &ActionsMenu, area: Rect) {
    let width = 28;
    let height = (actions.items.len() as u16) + 2; // +2 for borders
    let popup_area = centered_rect(width, height, area);

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Actions ")
        .title_style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD));

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    for (i, (label, _)) in actions.items.iter().enumerate() {
        let style = if i == actions.selected {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };

        let item_area = Rect::new(inner.x, inner.y + i as u16, inner.width, 1);
        frame.render_widget(Paragraph::new(format!(" {} ", label)).style(style), item_area);
    }
}

fn draw_filters(frame: &mut Frame, filters: &FiltersMenu, area: Rect) {
    let width = 60u16.min(area.width.saturating_sub(4));
    let height = 13u16;
    let popup_area = centered_rect(width, height, area);

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Filters (Tab to navigate, Enter to apply) ")
        .title_style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD));

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let label_w = 13u16;
    let field_w = inner.width.saturating_sub(label_w + 1);
    let field_bg = |focused: bool| {
        if focused {
            Color::Rgb(0, 50, 70)
        } else {
            Color::Rgb(30, 30, 40)
        }
    };
    let label_style = |focused: bool| {
        if focused {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        }
    };

    // Helper to draw a text field with placeholder
    let draw_field =
        |frame: &mut Frame, y: u16, label: &str, value: &str, placeholder: &str, focused: bool| {
            let label_area = Rect::new(inner.x + 1, y, label_w, 1);
            let value_area = Rect::new(inner.x + label_w + 1, y, field_w.saturating_sub(1), 1);
            frame.render_widget(Paragraph::new(label).style(label_style(focused)), label_area);

            let w = field_w.saturating_sub(1) as usize;
            let (display, style) = if value.is_empty() {
                (
                    format!("{:w$}", placeholder, w = w),
                    Style::default()
                        .fg(Color::DarkGray)
                        .bg(field_bg(focused))
                        .add_modifier(Modifier::ITALIC),
                )
            } else {
                (
                    format!("{:w$}", value, w = w),
                    Style::default().fg(Color::White).bg(field_bg(focused)),
                )
            };
            frame.render_widget(Paragraph::new(display).style(style), value_area);
        };

    let section = |frame: &mut Frame, y: u16, title: &str| {
        let rule = format!("-- {} {}", title, "-".repeat(48usize.saturating_sub(title.len())));
        frame.render_widget(
            Paragraph::new(rule).style(Style::default().fg(Color::DarkGray)),
            Rect::new(inner.x + 1, y, inner.width.saturating_sub(2), 1),
        );
    };

    let focus = filters.focused_field;
    let mut y = inner.y;

    section(frame, y, "Listing");
    y += 1;
    draw_field(frame, y, " Category:", &filters.category.text, "e.g. books", focus == FilterField::Category);
    y += 1;
    draw_field(frame, y, " Condition:", &filters.condition.text, "e.g. like-new", focus == FilterField::Condition);
    y += 1;
    draw_field(frame, y, " Location:", &filters.location.text, "e.g. Leeds", focus == FilterField::Location);
    y += 1;

    section(frame, y, "Distance");
    y += 1;
    draw_field(frame, y, " Near:", &filters.near.text, "lat,lng", focus == FilterField::Near);
    y += 1;
    draw_field(frame, y, " Within km:", &filters.distance.text, "10", focus == FilterField::Distance);
    y += 1;

    section(frame, y, "Order");
    y += 1;
    let sort_focused = focus == FilterField::Sort;
    frame.render_widget(
        Paragraph::new(" Sort:").style(label_style(sort_focused)),
        Rect::new(inner.x + 1, y, label_w, 1),
    );
    frame.render_widget(
        Paragraph::new(format!(" < {:^14} > ", filters.sort.label()))
            .style(Style::default().fg(Color::White).bg(field_bg(sort_focused))),
        Rect::new(inner.x + label_w + 1, y, field_w.saturating_sub(1), 1),
    );
    y += 1;

    // Buttons row with some spacing
    let btn_y = (y + 1).min(inner.y + inner.height.saturating_sub(1));
    let btn_area = Rect::new(inner.x + 1, btn_y, inner.width.saturating_sub(2), 1);
    let button_style = |field: FilterField, color: Color| {
        if focus == field {
            Style::default()
                .fg(Color::Black)
                .bg(color)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(color)
        }
    };

    let buttons = Line::from(vec![
        Span::raw("    "),
        Span::styled(" [Apply] ", button_style(FilterField::Apply, Color::Green)),
        Span::raw("    "),
        Span::styled(" [Clear] ", button_style(FilterField::Clear, Color::Yellow)),
        Span::raw("    "),
        Span::styled(" [Cancel] ", button_style(FilterField::Cancel, Color::Red)),
    ]);
    frame.render_widget(Paragraph::new(buttons), btn_area);

    // Show cursor on focused text input
    let field = match focus {
        FilterField::Category => Some((1, &filters.category)),
        FilterField::Condition => Some((2, &filters.condition)),
        FilterField::Location => Some((3, &filters.location)),
        FilterField::Near => Some((5, &filters.near)),
        FilterField::Distance => Some((6, &filters.distance)),
        _ => None,
    };
    if let Some((row, input)) = field {
        let cursor_x = inner.x + label_w + 1 + cursor_column(&input.text, input.cursor);
        frame.set_cursor_position(Position::new(cursor_x, inner.y + row));
    }
}

fn draw_info_dialog(frame: &mut Frame, info: &InfoDialog, area: Rect) {
    let max_line_len = info.lines.iter().map(|l| l.width()).max().unwrap_or(20);
    let width = ((max_line_len + 4) as u16)
        .max(30)
        .min(area.width.saturating_sub(4));
    let height = ((info.lines.len() + 3) as u16).min(area.height.saturating_sub(4));
    let popup_area = centered_rect(width, height, area);

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" {} ", info.title))
        .title_style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD));

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    for (i, line) in info.lines.iter().enumerate() {
        if i as u16 >= inner.height {
            break;
        }
        let line_area = Rect::new(
            inner.x + 1,
            inner.y + i as u16,
            inner.width.saturating_sub(2),
            1,
        );
        frame.render_widget(
            Paragraph::new(line.as_str()).style(Style::default().fg(Color::White)),
            line_area,
        );
    }
}
