//! Plain-text rendering of the screen for the terminal.

use super::screen::{Card, Fragment, Row, RowAction, Screen, StatCard, Table, Tone};
use crate::core::{Kind, Notifier, PublicView, Section, Tab, ViewState};

/// Renders the active section, then inline messages and toasts.
#[must_use]
pub fn render(screen: &Screen, view: &ViewState, notifier: &Notifier) -> String {
    let mut lines = vec![nav_line(screen)];
    lines.push(String::new());

    match view.section() {
        Section::Home => {
            lines.push("Welcome. Browse shops with `shops`, or log in with `login`.".to_string());
            if !matches!(screen.shops, Fragment::Unloaded) {
                lines.push(String::new());
                lines.extend(fragment_lines(&screen.shops));
            }
        }
        Section::Public => match view.public_view() {
            PublicView::ShopList => {
                lines.push("Shops".to_string());
                lines.extend(fragment_lines(&screen.shops));
            }
            PublicView::ShopProducts { shop_name, .. } => {
                let title = screen.storefront_title.as_deref().unwrap_or(shop_name);
                lines.push(title.to_string());
                lines.extend(fragment_lines(&screen.storefront));
                lines.extend(detail_lines(&screen.product_detail));
            }
        },
        Section::Login => lines.push("Log in".to_string()),
        Section::Register => lines.push("Create an account".to_string()),
        Section::Dashboard => lines.extend(dashboard_lines(screen, view.tab())),
    }

    let messages: Vec<String> = notifier
        .field_messages()
        .map(|(target, msg)| format!("{} ({target}): {}", marker(msg.kind), msg.message))
        .chain(
            notifier
                .toasts()
                .iter()
                .map(|toast| format!("{} {}", marker(toast.kind), toast.message)),
        )
        .collect();
    if !messages.is_empty() {
        lines.push(String::new());
        lines.extend(messages);
    }

    lines.join("\n")
}

const fn marker(kind: Kind) -> &'static str {
    match kind {
        Kind::Success => "[ok]",
        Kind::Error => "[error]",
    }
}

fn nav_line(screen: &Screen) -> String {
    let mut links = vec!["Home", "Shops"];
    if screen.nav.login {
        links.extend(["Login", "Register"]);
    }
    if screen.nav.dashboard {
        links.push("Dashboard");
    }
    if screen.nav.logout {
        links.push("Logout");
    }
    links.join(" | ")
}

fn dashboard_lines(screen: &Screen, tab: Tab) -> Vec<String> {
    let Some(user_info) = &screen.user_info else {
        return vec!["Log in to see the dashboard.".to_string()];
    };
    let mut lines = vec![format!("Dashboard - {user_info}")];

    let mut tabs = vec![Tab::Products, Tab::Transactions];
    if screen.users_tab_visible {
        tabs.push(Tab::Users);
    }
    if screen.shop_tab_visible {
        tabs.push(Tab::Shop);
    }
    lines.push(
        tabs.iter()
            .map(|t| {
                if *t == tab {
                    format!("[{t}]")
                } else {
                    t.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join("  "),
    );
    lines.push(String::new());
    lines.extend(fragment_lines(&screen.stats));
    lines.push(String::new());

    match tab {
        Tab::Products => {
            lines.extend(fragment_lines(&screen.products));
            lines.extend(detail_lines(&screen.product_detail));
            if !matches!(screen.low_stock, Fragment::Unloaded) {
                lines.push(String::new());
                lines.push("Low stock".to_string());
                lines.extend(fragment_lines(&screen.low_stock));
            }
        }
        Tab::Transactions => lines.extend(fragment_lines(&screen.transactions)),
        Tab::Users => lines.extend(fragment_lines(&screen.users)),
        Tab::Shop => lines.extend(fragment_lines(&screen.shop_settings)),
    }
    lines
}

/// The opened product, or nothing when none was opened.
fn detail_lines(detail: &Fragment) -> Vec<String> {
    if matches!(detail, Fragment::Unloaded) {
        return Vec::new();
    }
    let mut lines = vec![String::new(), "Product".to_string()];
    lines.extend(fragment_lines(detail).into_iter().map(|line| format!("    {line}")));
    lines
}

fn fragment_lines(fragment: &Fragment) -> Vec<String> {
    match fragment {
        Fragment::Unloaded => vec!["(not loaded)".to_string()],
        Fragment::Empty(placeholder) => vec![placeholder.clone()],
        Fragment::Table(table) => table_lines(table),
        Fragment::Cards(cards) => cards.iter().flat_map(card_lines).collect(),
        Fragment::Stats(stats) => vec![stats.iter().map(stat_text).collect::<Vec<_>>().join("  |  ")],
        Fragment::Details(pairs) => pairs
            .iter()
            .map(|(label, value)| format!("{label}: {value}"))
            .collect(),
    }
}

fn stat_text(stat: &StatCard) -> String {
    match stat.tone {
        Tone::Normal => format!("{}: {}", stat.label, stat.value),
        Tone::Profit => format!("{}: +{}", stat.label, stat.value),
        Tone::Warning => format!("{}: {} !", stat.label, stat.value),
    }
}

fn card_lines(card: &Card) -> Vec<String> {
    let mut heading = match card.opens {
        Some(id) => format!("#{id} {}", card.title),
        None => card.title.clone(),
    };
    if let Some(tag) = &card.tag {
        heading.push_str(&format!(" [{tag}]"));
    }
    let mut lines = vec![heading];
    let details = [&card.body, &card.price, &card.status, &card.link, &card.image];
    lines.extend(details.into_iter().flatten().map(|text| format!("    {text}")));
    lines
}

fn action_text(row: &Row) -> String {
    match row.action {
        Some(RowAction::DeleteProduct(id) | RowAction::DeleteUser(id) | RowAction::DeleteTransaction(id)) => {
            format!("#{id}")
        }
        Some(RowAction::SelfMarker) => "(you)".to_string(),
        None => String::new(),
    }
}

fn table_lines(table: &Table) -> Vec<String> {
    let with_actions = table.rows.iter().any(|row| row.action.is_some());
    let mut grid: Vec<Vec<String>> = Vec::with_capacity(table.rows.len() + 1);

    let mut header = table.headers.clone();
    if with_actions {
        header.insert(0, "Id".to_string());
    }
    grid.push(header);
    for row in &table.rows {
        let mut cells: Vec<String> = row
            .cells
            .iter()
            .map(|cell| {
                if cell.warning {
                    format!("{} !", cell.text)
                } else {
                    cell.text.clone()
                }
            })
            .collect();
        if with_actions {
            cells.insert(0, action_text(row));
        }
        grid.push(cells);
    }

    let columns = grid.iter().map(Vec::len).max().unwrap_or(0);
    let widths: Vec<usize> = (0..columns)
        .map(|i| {
            grid.iter()
                .filter_map(|row| row.get(i))
                .map(|text| text.chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    grid.iter()
        .map(|row| {
            row.iter()
                .zip(&widths)
                .map(|(text, &width)| format!("{text:<width$}"))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        entities::Role,
        ui::{
            screen::{Cell, NavBar},
            views,
        },
    };
    use std::time::Duration;

    fn notifier() -> Notifier {
        Notifier::new(Duration::from_secs(5), Duration::from_secs(4))
    }

    #[test]
    fn test_logged_out_nav_offers_login_only() {
        let screen = Screen::default();
        let text = render(&screen, &ViewState::new(), &notifier());
        let nav = text.lines().next().unwrap();
        assert!(nav.contains("Login"));
        assert!(!nav.contains("Dashboard"));
        assert!(!nav.contains("Logout"));
    }

    #[test]
    fn test_dashboard_hides_users_tab_for_admin() {
        let mut screen = Screen {
            nav: NavBar::for_logged_in(true),
            user_info: Some("Lina (Admin)".to_string()),
            ..Screen::default()
        };
        screen.products = views::products_table(&[], Some(Role::Admin));
        let mut view = ViewState::new();
        view.show_section(Section::Dashboard, Some(Role::Admin));

        let text = render(&screen, &view, &notifier());
        assert!(text.contains("[products]  transactions"));
        assert!(!text.contains("users"));
        assert!(text.contains(views::NO_PRODUCTS));
    }

    #[test]
    fn test_toasts_listed_after_content() {
        let mut n = notifier();
        n.notify("Product added successfully", Kind::Success);
        n.notify("Unable to reach the server", Kind::Error);
        let text = render(&Screen::default(), &ViewState::new(), &n);
        let tail: Vec<_> = text.lines().rev().take(2).collect();
        assert_eq!(tail, ["[error] Unable to reach the server", "[ok] Product added successfully"]);
    }

    #[test]
    fn test_table_aligns_columns_and_marks_warnings() {
        let table = Table {
            headers: vec!["Name".to_string(), "Stock".to_string()],
            rows: vec![Row {
                cells: vec![
                    Cell::plain("Widget"),
                    Cell::flagged("3", true),
                ],
                action: Some(RowAction::DeleteProduct(7)),
            }],
        };
        let lines = table_lines(&table);
        assert_eq!(lines[0], "Id  Name    Stock");
        assert_eq!(lines[1], "#7  Widget  3 !");
    }

    #[test]
    fn test_opened_product_listed_under_storefront() {
        let mut screen = Screen {
            storefront: Fragment::empty(views::NO_STOREFRONT_PRODUCTS),
            product_detail: Fragment::Details(vec![("Name".to_string(), "Phone".to_string())]),
            ..Screen::default()
        };
        screen.storefront_title = Some("Corner Shop".to_string());
        let mut view = ViewState::new();
        view.open_storefront(3, "Corner Shop".to_string());

        let text = render(&screen, &view, &notifier());
        assert!(text.contains("Corner Shop\nNo products available\n\nProduct\n    Name: Phone"));
    }
}
