use chrono::Utc;

use super::{Notification, NotificationKind};
use crate::{
    domain::{money::format_rupiah, phone},
    entity::{orders::Model as OrderModel, stores::Model as StoreModel},
};

/// Which number a message goes out from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sender {
    /// The store's own registered number, in international form.
    Store(String),
    PlatformDefault,
}

impl Sender {
    pub fn into_phone(self) -> Option<String> {
        match self {
            Sender::Store(phone) => Some(phone),
            Sender::PlatformDefault => None,
        }
    }
}

/// Uses the store's number only when the store opted in and the number is
/// present and valid. Independent of message content.
pub fn select_sender(store: &StoreModel) -> Sender {
    match store.phone.as_deref() {
        Some(number) if store.use_own_number_for_messages && phone::is_valid(number) => {
            Sender::Store(phone::to_international(number))
        }
        _ => Sender::PlatformDefault,
    }
}

pub fn render(kind: NotificationKind, order: &OrderModel, store: &StoreModel) -> String {
    let name = order.customer_name.trim();
    let total = format_rupiah(order.total);
    let remaining = (order.total - order.amount_tendered).max(0);
    let mut lines: Vec<String> = Vec::new();

    match kind {
        NotificationKind::OrderCreated => {
            lines.push(format!("Hi {name}!"));
            lines.push(String::new());
            lines.push(format!("Your laundry order at {} has been received.", store.name));
            lines.push(format!("Order: {}", order.order_number));
            lines.push(format!("Total: {total}"));
            if let Some(due) = order.estimated_completion {
                lines.push(format!(
                    "Estimated ready: {}",
                    due.with_timezone(&Utc).format("%d %b %Y %H:%M")
                ));
            }
            if order.points_earned > 0 {
                lines.push(format!("You earned {} loyalty points.", order.points_earned));
            }
            lines.push(String::new());
            lines.push("We will let you know when it is ready. Thank you!".into());
        }
        NotificationKind::OrderReady => {
            lines.push(format!("Hi {name}!"));
            lines.push(String::new());
            lines.push("Good news! Your laundry is READY FOR PICKUP.".into());
            lines.push(format!("Order: {}", order.order_number));
            lines.push(format!("Total: {total}"));
            if remaining > 0 {
                lines.push(format!("Remaining balance: {}", format_rupiah(remaining)));
            }
            lines.push(String::new());
            lines.push(format!("See you at {}!", store.name));
        }
        NotificationKind::OrderCompleted => {
            lines.push(format!("Hi {name}!"));
            lines.push(String::new());
            lines.push(format!(
                "Thank you for choosing {}. Order {} is complete.",
                store.name, order.order_number
            ));
            lines.push(String::new());
            lines.push("See you on your next order!".into());
        }
        NotificationKind::PaymentReminder => {
            lines.push(format!("Hi {name}!"));
            lines.push(String::new());
            lines.push("A friendly reminder about the payment for your order.".into());
            lines.push(format!("Order: {}", order.order_number));
            lines.push(format!("Outstanding: {}", format_rupiah(remaining)));
            lines.push(String::new());
            lines.push("Thank you!".into());
        }
    }

    lines.join("\n")
}

/// Builds the message for `order`, or `None` when the customer has no usable
/// phone number.
pub fn compose(
    kind: NotificationKind,
    order: &OrderModel,
    store: &StoreModel,
) -> Option<Notification> {
    if !phone::is_valid(&order.customer_phone) {
        return None;
    }
    Some(Notification {
        order_id: order.id,
        kind,
        destination: phone::to_international(&order.customer_phone),
        body: render(kind, order, store),
        sender: select_sender(store).into_phone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::status::{FulfillmentStatus, PaymentStatus};
    use uuid::Uuid;

    fn store(phone: Option<&str>, own_number: bool) -> StoreModel {
        let now = Utc::now().into();
        StoreModel {
            id: Uuid::new_v4(),
            name: "Fresh Laundry".into(),
            phone: phone.map(str::to_string),
            address: None,
            points_enabled: true,
            use_own_number_for_messages: own_number,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn order(store_id: Uuid) -> OrderModel {
        let now = Utc::now().into();
        OrderModel {
            id: Uuid::new_v4(),
            store_id,
            order_number: "ORD-20260101-abcdef12".into(),
            customer_id: None,
            customer_name: "Sari".into(),
            customer_phone: "0812-3456-7890".into(),
            subtotal: 16_100,
            discount: 0,
            total: 16_100,
            fulfillment_status: FulfillmentStatus::InQueue,
            payment_status: PaymentStatus::DownPayment,
            payment_method: "cash".into(),
            amount_tendered: 10_000,
            points_earned: 2,
            estimated_completion: None,
            paid_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn own_number_used_only_when_opted_in_and_valid() {
        assert_eq!(
            select_sender(&store(Some("0811-222-3333"), true)),
            Sender::Store("628112223333".into())
        );
        assert_eq!(
            select_sender(&store(Some("0811-222-3333"), false)),
            Sender::PlatformDefault
        );
        assert_eq!(select_sender(&store(None, true)), Sender::PlatformDefault);
        assert_eq!(
            select_sender(&store(Some("not-a-number"), true)),
            Sender::PlatformDefault
        );
    }

    #[test]
    fn created_message_mentions_total_and_points() {
        let s = store(None, false);
        let body = render(NotificationKind::OrderCreated, &order(s.id), &s);
        assert!(body.contains("Hi Sari!"));
        assert!(body.contains("ORD-20260101-abcdef12"));
        assert!(body.contains("Rp 16,100"));
        assert!(body.contains("2 loyalty points"));
    }

    #[test]
    fn ready_message_shows_remaining_balance() {
        let s = store(None, false);
        let body = render(NotificationKind::OrderReady, &order(s.id), &s);
        assert!(body.contains("READY FOR PICKUP"));
        assert!(body.contains("Remaining balance: Rp 6,100"));
    }

    #[test]
    fn compose_targets_international_number() {
        let s = store(Some("0811-222-3333"), true);
        let n = compose(NotificationKind::OrderCompleted, &order(s.id), &s).unwrap();
        assert_eq!(n.destination, "6281234567890");
        assert_eq!(n.sender.as_deref(), Some("628112223333"));
    }

    #[test]
    fn compose_skips_unusable_phone() {
        let s = store(None, false);
        let mut o = order(s.id);
        o.customer_phone = "-".into();
        assert!(compose(NotificationKind::OrderReady, &o, &s).is_none());
    }
}
