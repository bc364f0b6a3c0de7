//! Overdue payment notifications.

use uuid::Uuid;

use paywatch_entity::notification::{
    NewNotification, NotificationPayload, NotificationType, RelatedEntity,
};

use super::money;
use crate::notification::overdue::OverdueReport;

/// One candidate per overdue fixed payment, credit card and installment.
#[derive(Debug, Clone, Copy, Default)]
pub struct OverdueRule;

impl OverdueRule {
    /// Turn a detector report into candidates.
    pub fn evaluate(&self, user_id: Uuid, report: &OverdueReport) -> Vec<NewNotification> {
        let mut out = Vec::with_capacity(report.len());

        for item in &report.fixed_payments {
            let p = &item.entity;
            out.push(NewNotification {
                user_id,
                notification_type: NotificationType::FixedPaymentOverdue,
                title: format!("Ödeme Gecikti: {}", p.name),
                message: format!(
                    "{} ödemesi {} gün önce yapılmalıydı - {} TL",
                    p.name,
                    item.days_overdue,
                    money(p.amount)
                ),
                priority: item.priority,
                related: RelatedEntity::FixedPayment(p.id),
                payload: NotificationPayload::FixedPaymentOverdue {
                    payment_id: p.id,
                    payment_name: p.name.clone(),
                    amount: p.amount,
                    due_date: item.due_date,
                    days_overdue: item.days_overdue,
                },
            });
        }

        for item in &report.credit_cards {
            let c = &item.entity;
            let minimum = c.minimum_payment();
            out.push(NewNotification {
                user_id,
                notification_type: NotificationType::CreditCardOverdue,
                title: format!("Kredi Kartı Ödemesi Gecikti: {}", c.name),
                message: format!(
                    "{} kredi kartı ödemesi {} gün gecikti - Minimum ödeme: {} TL, Toplam borç: {} TL",
                    c.name,
                    item.days_overdue,
                    money(minimum),
                    money(c.current_balance)
                ),
                priority: item.priority,
                related: RelatedEntity::CreditCard(c.id),
                payload: NotificationPayload::CreditCardOverdue {
                    card_id: c.id,
                    card_name: c.name.clone(),
                    current_balance: c.current_balance,
                    minimum_payment: minimum,
                    due_date: item.due_date,
                    days_overdue: item.days_overdue,
                },
            });
        }

        for item in &report.installments {
            let i = &item.entity;
            let number = i.next_installment_number();
            out.push(NewNotification {
                user_id,
                notification_type: NotificationType::InstallmentOverdue,
                title: format!("Taksit Ödemesi Gecikti: {}", i.item_name),
                message: format!(
                    "{} - {}. taksit ödemesi {} gün gecikti - {} TL",
                    i.item_name,
                    number,
                    item.days_overdue,
                    money(i.installment_amount)
                ),
                priority: item.priority,
                related: RelatedEntity::Installment(i.id),
                payload: NotificationPayload::InstallmentOverdue {
                    installment_id: i.id,
                    item_name: i.item_name.clone(),
                    installment_amount: i.installment_amount,
                    installment_number: number,
                    total_installments: i.total_installments,
                    due_date: item.due_date,
                    days_overdue: item.days_overdue,
                },
            });
        }

        out
    }
}
