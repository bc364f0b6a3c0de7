//! Credit card statement reminders at 5 and 0 days.

use chrono::{Datelike, NaiveDate};
use uuid::Uuid;

use paywatch_entity::finance::CreditCard;
use paywatch_entity::notification::{
    NewNotification, NotificationPayload, NotificationPriority, NotificationType, RelatedEntity,
};

use super::money;
use crate::calendar::{date_after, days_until_due, turkish_month_name};

/// Emits a reminder when a card's due day is exactly 5 or 0 days away.
#[derive(Debug, Clone, Copy, Default)]
pub struct CreditCardRule;

impl CreditCardRule {
    /// Evaluate every active card; cards without a due day are skipped.
    pub fn evaluate(
        &self,
        user_id: Uuid,
        today: NaiveDate,
        cards: &[CreditCard],
    ) -> Vec<NewNotification> {
        let mut out = Vec::new();
        for card in cards.iter().filter(|c| c.is_active) {
            let Some(due_day) = card.valid_due_day() else {
                continue;
            };
            let days = days_until_due(today, due_day);
            let minimum = card.minimum_payment();
            let name = &card.name;

            let (notification_type, priority, title, message) = match days {
                5 => {
                    let due = date_after(today, days);
                    (
                        NotificationType::CreditCard5Day,
                        NotificationPriority::Medium,
                        format!("{name} - Son ödeme tarihi yaklaşıyor"),
                        format!(
                            "{name} kredi kartı son ödeme tarihi 5 gün sonra ({} {}) - Minimum ödeme: {} TL",
                            due.day(),
                            turkish_month_name(due.month()),
                            money(minimum)
                        ),
                    )
                }
                0 => (
                    NotificationType::CreditCardToday,
                    NotificationPriority::High,
                    format!("{name} - Bugün son ödeme günü!"),
                    format!(
                        "{name} kredi kartı ödemesi bugün yapılmalı - Minimum ödeme: {} TL, Toplam borç: {} TL",
                        money(minimum),
                        money(card.current_balance)
                    ),
                ),
                _ => continue,
            };

            out.push(NewNotification {
                user_id,
                notification_type,
                title,
                message,
                priority,
                related: RelatedEntity::CreditCard(card.id),
                payload: NotificationPayload::CreditCardDue {
                    card_id: card.id,
                    card_name: card.name.clone(),
                    current_balance: card.current_balance,
                    minimum_payment: minimum,
                    due_day,
                    days_until_due: days,
                },
            });
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(due: Option<i32>) -> CreditCard {
        CreditCard {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            name: "Bonus".into(),
            current_balance: 10_000.0,
            minimum_payment_rate: 20.0,
            payment_due_date: due,
            is_active: true,
            last_payment_on: None,
        }
    }

    #[test]
    fn test_five_day_reminder_carries_minimum_payment() {
        let today = NaiveDate::from_ymd_opt(2026, 9, 5).unwrap();
        let out = CreditCardRule.evaluate(Uuid::nil(), today, &[card(Some(10)), card(None)]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].notification_type, NotificationType::CreditCard5Day);
        assert_eq!(
            out[0].message,
            "Bonus kredi kartı son ödeme tarihi 5 gün sonra (10 Eylül) - Minimum ödeme: 2000.00 TL"
        );
        match &out[0].payload {
            NotificationPayload::CreditCardDue {
                minimum_payment, ..
            } => assert_eq!(*minimum_payment, 2000.0),
            other => panic!("unexpected payload {other:?}"),
        }
    }

    #[test]
    fn test_due_today_is_high() {
        let today = NaiveDate::from_ymd_opt(2026, 9, 10).unwrap();
        let out = CreditCardRule.evaluate(Uuid::nil(), today, &[card(Some(10))]);
        assert_eq!(out[0].notification_type, NotificationType::CreditCardToday);
        assert_eq!(out[0].priority, NotificationPriority::High);
        assert!(out[0].message.ends_with("Toplam borç: 10000.00 TL"));
    }
}
