use costs_core::CollectedPeriod;
use costs_db::Db;

use crate::error::Result;
use crate::services::column;

#[derive(Clone, Debug, Default)]
pub struct StatusService;

impl StatusService {
    pub fn collected_periods(&self, db: &Db) -> Result<Vec<CollectedPeriod>> {
        Ok(db.collection_status()?)
    }

    pub fn render(&self, db: &Db) -> Result<String> {
        Ok(render_status(&self.collected_periods(db)?))
    }
}

pub fn render_status(rows: &[CollectedPeriod]) -> String {
    let mut out = format!(
        "{} {} {}\n{} {} {}\n",
        column("Subscription", 50),
        column("Subscription Id", 37),
        "Period",
        "=".repeat(50),
        "=".repeat(37),
        "=".repeat(8)
    );
    for row in rows {
        out.push_str(&format!(
            "{} {} {}\n",
            column(&row.subscription_name, 50),
            column(&row.subscription_id, 37),
            row.billing_period
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_table_has_one_line_per_period() {
        let rows = vec![
            CollectedPeriod {
                subscription_name: "Prod".to_string(),
                subscription_id: "6f1d2c7e-1b7a-4c43-9d0e-2f3a1b4c5d6e".to_string(),
                billing_period: "2024-01".to_string(),
            },
            CollectedPeriod {
                subscription_name: "Prod".to_string(),
                subscription_id: "6f1d2c7e-1b7a-4c43-9d0e-2f3a1b4c5d6e".to_string(),
                billing_period: "2024-02".to_string(),
            },
        ];
        let rendered = render_status(&rows);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("Subscription "));
        assert!(lines[2].ends_with("6f1d2c7e-1b7a-4c43-9d0e-2f3a1b4c5d6e  2024-01"));
    }
}
