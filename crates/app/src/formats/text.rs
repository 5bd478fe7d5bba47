use super::{CostReport, ReportFormatter, truncate_chars};
use crate::error::Result;

const NAME_WIDTH: usize = 70;
const SUBSCRIPTION_WIDTH: usize = 30;
const COST_WIDTH: usize = 12;

/// Fixed-width table, one line per resource group.
pub struct TextFormatter;

impl ReportFormatter for TextFormatter {
    fn render(&self, report: &CostReport) -> Result<Vec<u8>> {
        let periods = report.periods();
        let rule = |width: usize| "=".repeat(width);

        let mut out = format!(
            "{:<NAME_WIDTH$} {:<SUBSCRIPTION_WIDTH$}",
            "Resource Group", "Subscription"
        );
        for period in &periods {
            out.push_str(&format!(" {:>COST_WIDTH$}", period));
        }
        out.push_str(&format!(" {:>COST_WIDTH$}\n", "Total Costs"));

        out.push_str(&format!(
            "{:<NAME_WIDTH$} {:<SUBSCRIPTION_WIDTH$}",
            rule(NAME_WIDTH),
            rule(SUBSCRIPTION_WIDTH)
        ));
        for _ in 0..=periods.len() {
            out.push(' ');
            out.push_str(&rule(COST_WIDTH));
        }
        out.push('\n');

        for row in &report.resource_groups {
            out.push_str(&format!(
                "{:<NAME_WIDTH$} {:<SUBSCRIPTION_WIDTH$}",
                truncate_chars(&row.name, NAME_WIDTH),
                truncate_chars(&row.subscription_name, SUBSCRIPTION_WIDTH)
            ));
            for cost in &row.costs {
                out.push_str(&format!(" {:>COST_WIDTH$.2}", cost.total));
            }
            out.push_str(&format!(" {:>COST_WIDTH$.2}\n", row.total_cost));
        }
        Ok(out.into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::fixtures;

    #[test]
    fn renders_header_rule_and_rows() {
        let rendered = fixtures::render_text(&TextFormatter, &fixtures::report());
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("Resource Group"));
        assert!(lines[0].ends_with("     2024-01      2024-02  Total Costs"));
        assert!(lines[1].starts_with(&"=".repeat(70)));
        assert!(lines[2].starts_with("data-rg"));
        assert!(lines[2].ends_with("       10.00         2.50        12.50"));
        assert!(lines[3].ends_with("        1.25         0.00         1.25"));
    }

    #[test]
    fn long_names_are_cut_to_column_width() {
        let mut report = fixtures::report();
        report.resource_groups[0].name = "x".repeat(90);
        let rendered = fixtures::render_text(&TextFormatter, &report);
        let row = rendered.lines().nth(2).expect("row");
        assert!(row.starts_with(&format!("{} ", "x".repeat(70))));
    }
}
