//! Invoice and customer records

use crate::core::error::{DashboardError, DashboardResult, StorageError};
use crate::core::money::Cents;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Payment status of an invoice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Pending,
    Paid,
}

impl InvoiceStatus {
    pub const ALL: [InvoiceStatus; 2] = [InvoiceStatus::Pending, InvoiceStatus::Paid];

    pub fn as_str(self) -> &'static str {
        match self {
            InvoiceStatus::Pending => "pending",
            InvoiceStatus::Paid => "paid",
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvoiceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(InvoiceStatus::Pending),
            "paid" => Ok(InvoiceStatus::Paid),
            other => Err(format!(
                "expected one of 'pending', 'paid' (got '{}')",
                other
            )),
        }
    }
}

/// A persisted invoice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: String,
    pub customer_id: String,
    /// Minor units
    pub amount: Cents,
    pub status: InvoiceStatus,
    pub date: NaiveDate,
}

/// The validated projection of an invoice form
///
/// Carries only what a client may set; `id` and `date` are always
/// decided server-side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceDraft {
    pub customer_id: String,
    pub amount: Cents,
    pub status: InvoiceStatus,
}

impl InvoiceDraft {
    /// Materialize a new invoice row from this draft
    pub fn into_invoice(self, id: String, date: NaiveDate) -> Invoice {
        Invoice {
            id,
            customer_id: self.customer_id,
            amount: self.amount,
            status: self.status,
            date,
        }
    }
}

/// A customer that invoices reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub email: String,
    pub image_url: Option<String>,
}

/// Aggregates shown on the dashboard overview cards
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CardData {
    pub total_paid: Cents,
    pub total_pending: Cents,
    pub number_of_invoices: usize,
    pub number_of_customers: usize,
}

fn add_to(total: &mut Cents, amount: Cents, what: &str) -> DashboardResult<()> {
    *total = total.checked_add(amount).ok_or_else(|| {
        DashboardError::Storage(StorageError::IntegrityError {
            message: format!("{} exceeds the representable amount", what),
        })
    })?;
    Ok(())
}

impl CardData {
    /// Fold a set of invoices and a customer count into card totals
    ///
    /// Fails instead of wrapping when a total leaves the `i64` cents range.
    pub fn from_invoices<'a>(
        invoices: impl IntoIterator<Item = &'a Invoice>,
        number_of_customers: usize,
    ) -> DashboardResult<Self> {
        let mut data = CardData {
            number_of_customers,
            ..Default::default()
        };
        for invoice in invoices {
            data.number_of_invoices += 1;
            match invoice.status {
                InvoiceStatus::Paid => add_to(&mut data.total_paid, invoice.amount, "total paid")?,
                InvoiceStatus::Pending => {
                    add_to(&mut data.total_pending, invoice.amount, "total pending")?
                }
            }
        }
        Ok(data)
    }
}

/// Collected (paid) amount of one calendar month
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyRevenue {
    /// `YYYY-MM`
    pub month: String,
    pub revenue: Cents,
}

impl MonthlyRevenue {
    /// Paid totals per month, oldest month first; months without paid
    /// invoices are left out
    pub fn from_invoices<'a>(
        invoices: impl IntoIterator<Item = &'a Invoice>,
    ) -> DashboardResult<Vec<Self>> {
        let mut months: BTreeMap<String, Cents> = BTreeMap::new();
        for invoice in invoices {
            if invoice.status != InvoiceStatus::Paid {
                continue;
            }
            let month = invoice.date.format("%Y-%m").to_string();
            let total = months.entry(month).or_default();
            add_to(total, invoice.amount, "monthly revenue")?;
        }
        Ok(months
            .into_iter()
            .map(|(month, revenue)| MonthlyRevenue { month, revenue })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invoice(status: InvoiceStatus, amount: i64) -> Invoice {
        Invoice {
            id: "i".to_string(),
            customer_id: "c".to_string(),
            amount: Cents::new(amount),
            status,
            date: NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date"),
        }
    }

    #[test]
    fn test_status_round_trips_through_str() {
        for status in InvoiceStatus::ALL {
            assert_eq!(status.as_str().parse::<InvoiceStatus>(), Ok(status));
        }
    }

    #[test]
    fn test_status_rejects_unknown() {
        let err = "overdue".parse::<InvoiceStatus>().unwrap_err();
        assert!(err.contains("overdue"));
        assert!("Paid".parse::<InvoiceStatus>().is_err());
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(InvoiceStatus::Pending).unwrap(),
            serde_json::json!("pending")
        );
    }

    #[test]
    fn test_invoice_serializes_amount_as_integer_and_iso_date() {
        let value = serde_json::to_value(invoice(InvoiceStatus::Paid, 1999)).unwrap();
        assert_eq!(value["amount"], 1999);
        assert_eq!(value["date"], "2024-01-01");
        assert_eq!(value["status"], "paid");
    }

    #[test]
    fn test_card_data_totals() {
        let invoices = vec![
            invoice(InvoiceStatus::Paid, 1000),
            invoice(InvoiceStatus::Paid, 500),
            invoice(InvoiceStatus::Pending, 250),
        ];
        let data = CardData::from_invoices(&invoices, 2).unwrap();
        assert_eq!(data.total_paid, Cents::new(1500));
        assert_eq!(data.total_pending, Cents::new(250));
        assert_eq!(data.number_of_invoices, 3);
        assert_eq!(data.number_of_customers, 2);
    }

    #[test]
    fn test_card_data_overflow_is_an_error() {
        let big = i64::MAX / 2 + 10;
        let invoices = vec![
            invoice(InvoiceStatus::Pending, big),
            invoice(InvoiceStatus::Pending, big),
        ];

        let err = CardData::from_invoices(&invoices, 0).unwrap_err();

        assert!(matches!(
            err,
            DashboardError::Storage(StorageError::IntegrityError { .. })
        ));
        assert!(err.to_string().contains("total pending"));
    }

    #[test]
    fn test_monthly_revenue_counts_paid_only() {
        let mut march = invoice(InvoiceStatus::Paid, 700);
        march.date = NaiveDate::from_ymd_opt(2024, 3, 9).expect("valid date");
        let invoices = vec![
            march,
            invoice(InvoiceStatus::Paid, 1000),
            invoice(InvoiceStatus::Paid, 500),
            invoice(InvoiceStatus::Pending, 250),
        ];

        let revenue = MonthlyRevenue::from_invoices(&invoices).unwrap();

        assert_eq!(
            revenue,
            vec![
                MonthlyRevenue {
                    month: "2024-01".to_string(),
                    revenue: Cents::new(1500),
                },
                MonthlyRevenue {
                    month: "2024-03".to_string(),
                    revenue: Cents::new(700),
                },
            ]
        );
    }

    #[test]
    fn test_monthly_revenue_overflow_is_an_error() {
        let big = i64::MAX / 2 + 10;
        let invoices = vec![invoice(InvoiceStatus::Paid, big), invoice(InvoiceStatus::Paid, big)];

        assert!(MonthlyRevenue::from_invoices(&invoices).is_err());
    }
}
