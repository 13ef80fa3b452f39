use crate::error::{TrackerError, TrackerResult};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

const PERSONAL_CATEGORIES: &[(&str, &str)] = &[
    ("Education", "Books, courses, seminars"),
    ("Health & beauty", "Hairdresser, pharmacy, clinic"),
    ("Gifts", "Birthdays, holidays"),
    ("Food", "Groceries, cafes, restaurants"),
    ("Home", "Small repairs, furniture, decor"),
    ("Transport", "Passes, bus, train, flights"),
    ("Leisure", "Vacation, going out, weekends"),
    ("Hobby", "3D printing, knitting, drawing, training"),
    ("Clothes", "Shirts, trousers, jackets, shoes"),
    ("Car", "Fuel, service, insurance, car wash"),
    ("Pets", "Food, vet, accessories"),
    ("Housing", "Utilities, rent"),
    ("Savings", "Money set aside for a goal"),
    ("Communication", "Internet, mobile"),
    ("Other", "Subscriptions"),
];

const WORK_CATEGORIES: &[(&str, &str)] = &[
    ("Equipment", "Computer, monitor, phone"),
    ("Training", "Professional development, conferences"),
    ("Workspace rent", "Garage, office"),
    ("Banking", "Loan interest, business account fees"),
    ("Consumables", "Paint, discs, gloves"),
    ("Transport", "Passes, train, bus, flights"),
    ("Health", "Pharmacy, clinic"),
    ("Delivery", "Car sharing, taxi"),
    ("Other", "Gifts, arrangements"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseKind {
    Personal,
    Work,
}

impl ExpenseKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ExpenseKind::Personal => "personal",
            ExpenseKind::Work => "work",
        }
    }

    /// `(category, hint)` pairs offered for this kind.
    pub fn categories(self) -> &'static [(&'static str, &'static str)] {
        match self {
            ExpenseKind::Personal => PERSONAL_CATEGORIES,
            ExpenseKind::Work => WORK_CATEGORIES,
        }
    }

    /// Case-insensitive category lookup returning the canonical name.
    pub fn canonical_category(self, input: &str) -> TrackerResult<&'static str> {
        let wanted = input.trim().to_lowercase();
        self.categories()
            .iter()
            .map(|(name, _)| *name)
            .find(|name| name.to_lowercase() == wanted)
            .ok_or_else(|| {
                TrackerError::InvalidInput(format!(
                    "Unknown {} category '{}'. See /categories",
                    self.as_str(),
                    input.trim()
                ))
            })
    }
}

impl FromStr for ExpenseKind {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "personal" | "p" | "личные" => Ok(ExpenseKind::Personal),
            "work" | "w" | "рабочие" => Ok(ExpenseKind::Work),
            other => Err(TrackerError::InvalidInput(format!(
                "Unknown expense type '{other}'. Use personal or work"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: String,
    pub chat_id: i64,
    pub kind: ExpenseKind,
    pub category: String,
    pub amount: f64,
    pub description: String,
    pub spent_at: DateTime<Utc>,
}

/// Validated input for a new expense.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    pub kind: ExpenseKind,
    pub category: &'static str,
    pub amount: f64,
    pub description: String,
}

/// Parses `kind;category;amount;description`. The description may be empty.
pub fn parse_expense_input(input: &str) -> TrackerResult<NewExpense> {
    let mut parts = input.splitn(4, ';').map(str::trim);
    let (Some(kind), Some(category), Some(amount)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(TrackerError::InvalidInput(
            "Use the format kind;category;amount;description".to_string(),
        ));
    };
    let description = parts.next().unwrap_or_default().to_string();

    let kind: ExpenseKind = kind.parse()?;
    let category = kind.canonical_category(category)?;
    let amount: f64 = amount
        .replace(',', ".")
        .parse()
        .map_err(|_| TrackerError::InvalidInput(format!("'{amount}' is not an amount")))?;
    if !amount.is_finite() || amount <= 0.0 {
        return Err(TrackerError::InvalidInput(
            "Amount must be greater than zero".to_string(),
        ));
    }

    Ok(NewExpense {
        kind,
        category,
        amount,
        description,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    pub category: String,
    pub amount: f64,
    pub share_percent: f64,
}

/// Spending over the last `period_days` days.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseReport {
    pub period_days: i64,
    pub total: f64,
    pub count: usize,
    pub by_category: Vec<CategoryTotal>,
}

impl ExpenseReport {
    pub fn build(expenses: &[Expense], period_days: i64, now: DateTime<Utc>) -> Self {
        let cutoff = now - Duration::days(period_days);
        let recent: Vec<&Expense> = expenses.iter().filter(|e| e.spent_at >= cutoff).collect();
        let total: f64 = recent.iter().map(|e| e.amount).sum();

        let mut sums: HashMap<&str, f64> = HashMap::new();
        for expense in &recent {
            *sums.entry(expense.category.as_str()).or_default() += expense.amount;
        }
        let mut by_category: Vec<CategoryTotal> = sums
            .into_iter()
            .map(|(category, amount)| CategoryTotal {
                category: category.to_string(),
                amount,
                share_percent: if total > 0.0 { amount / total * 100.0 } else { 0.0 },
            })
            .collect();
        by_category.sort_by(|a, b| {
            b.amount
                .total_cmp(&a.amount)
                .then_with(|| a.category.cmp(&b.category))
        });

        Self {
            period_days,
            total,
            count: recent.len(),
            by_category,
        }
    }

    /// Chat summary with the top `limit` categories.
    pub fn render(&self, limit: usize) -> String {
        if self.count == 0 {
            return format!("No expenses in the last {} days", self.period_days);
        }
        let mut text = format!(
            "📊 Expense report\n\nPeriod: last {} days\nEntries: {}\nTotal: {:.2}\n\nTop categories:\n",
            self.period_days, self.count, self.total
        );
        for item in self.by_category.iter().take(limit) {
            text.push_str(&format!(
                "• {}: {:.2} ({:.1}%)\n",
                item.category, item.amount, item.share_percent
            ));
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expense(category: &str, amount: f64, days_ago: i64) -> Expense {
        Expense {
            id: format!("{category}-{days_ago}"),
            chat_id: 1,
            kind: ExpenseKind::Personal,
            category: category.to_string(),
            amount,
            description: String::new(),
            spent_at: Utc::now() - Duration::days(days_ago),
        }
    }

    #[test]
    fn test_parse_expense_input() {
        let parsed = parse_expense_input("work; equipment ; 5000 ; New monitor");
        let parsed = parsed.ok();
        assert_eq!(parsed.as_ref().map(|e| e.category), Some("Equipment"));
        assert_eq!(parsed.as_ref().map(|e| e.kind), Some(ExpenseKind::Work));
        assert_eq!(parsed.as_ref().map(|e| e.description.as_str()), Some("New monitor"));

        let no_description = parse_expense_input("personal;food;12,5");
        assert_eq!(no_description.ok().map(|e| e.amount), Some(12.5));

        assert!(parse_expense_input("work;Equipment").is_err());
        assert!(parse_expense_input("work;Unicorns;10").is_err());
        assert!(parse_expense_input("fun;Food;10").is_err());
        assert!(parse_expense_input("personal;Food;0").is_err());
    }

    #[test]
    fn test_report_groups_and_sorts_categories() {
        let expenses = vec![
            expense("Food", 300.0, 1),
            expense("Car", 500.0, 2),
            expense("Food", 300.0, 3),
            expense("Gifts", 1000.0, 40),
        ];
        let report = ExpenseReport::build(&expenses, 30, Utc::now());
        assert_eq!(report.count, 3);
        assert!((report.total - 1100.0).abs() < f64::EPSILON);
        assert_eq!(report.by_category[0].category, "Food");
        assert!((report.by_category[0].share_percent - 54.54).abs() < 0.1);
        assert_eq!(report.by_category[1].category, "Car");
        assert!(report.render(5).contains("Total: 1100.00"));
    }

    #[test]
    fn test_empty_report() {
        let report = ExpenseReport::build(&[], 7, Utc::now());
        assert_eq!(report.count, 0);
        assert!(report.render(5).contains("No expenses"));
    }

    #[test]
    fn test_categories_are_kind_specific() {
        assert!(ExpenseKind::Personal.canonical_category("pets").is_ok());
        assert!(ExpenseKind::Work.canonical_category("pets").is_err());
        assert_eq!(ExpenseKind::Work.canonical_category("OTHER").ok(), Some("Other"));
    }
}
