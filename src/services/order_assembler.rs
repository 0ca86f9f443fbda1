//! Validates and prices a candidate order. No I/O: catalog entries are
//! resolved by the caller and passed in, so everything here can be checked
//! before a transaction is opened.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    domain::{
        points,
        pricing::{self, PricingMode, ServiceDefinition, ServiceDuration},
        status::{FulfillmentStatus, PaymentStatus},
    },
    dto::orders::{CreateOrderRequest, OrderLineRequest},
    error::{AppError, AppResult},
    services::customer_service::CustomerDetails,
};

pub const DEFAULT_PAYMENT_METHOD: &str = "cash";

/// Largest quantity accepted on one line.
pub const MAX_QUANTITY: f64 = 10_000.0;
/// Largest weight accepted on one line, in kilograms.
pub const MAX_WEIGHT_KG: f64 = 1_000.0;

#[derive(Debug, Clone, PartialEq)]
pub struct DraftLine {
    pub service_id: Option<Uuid>,
    pub name: String,
    pub pricing_mode: PricingMode,
    pub quantity: Option<f64>,
    pub weight_kg: Option<f64>,
    pub unit_price: Option<i64>,
    pub weight_price: Option<i64>,
    pub line_total: i64,
    pub estimated_completion: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderDraft {
    pub store_id: Uuid,
    pub customer: CustomerDetails,
    pub lines: Vec<DraftLine>,
    pub subtotal: i64,
    pub discount: i64,
    pub total: i64,
    pub payment_method: String,
    pub amount_tendered: i64,
    pub payment_status: PaymentStatus,
    pub fulfillment_status: FulfillmentStatus,
    pub estimated_completion: Option<DateTime<Utc>>,
    /// Points the order is worth once settled.
    pub projected_points: i64,
}

impl OrderDraft {
    pub fn change_due(&self) -> i64 {
        (self.amount_tendered - self.total).max(0)
    }
}

pub fn assemble(
    store_id: Uuid,
    request: &CreateOrderRequest,
    catalog: &HashMap<Uuid, ServiceDefinition>,
    now: DateTime<Utc>,
) -> AppResult<OrderDraft> {
    let customer = CustomerDetails::from_input(&request.customer)?;

    if request.items.is_empty() {
        return Err(AppError::BadRequest("Order has no items".into()));
    }

    let lines = request
        .items
        .iter()
        .map(|line| price_line(line, catalog, now))
        .collect::<AppResult<Vec<_>>>()?;

    let subtotal = lines
        .iter()
        .try_fold(0_i64, |acc, l| acc.checked_add(l.line_total))
        .ok_or_else(|| AppError::BadRequest("Order total is too large".into()))?;

    let discount = request.discount.unwrap_or(0);
    if discount < 0 {
        return Err(AppError::BadRequest("Discount must not be negative".into()));
    }
    if discount > subtotal {
        return Err(AppError::BadRequest("Discount exceeds subtotal".into()));
    }
    let total = subtotal - discount;

    let amount_tendered = request.amount_tendered.unwrap_or(0);
    if amount_tendered < 0 {
        return Err(AppError::BadRequest("Amount tendered must not be negative".into()));
    }

    let payment_method = request
        .payment_method
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .unwrap_or(DEFAULT_PAYMENT_METHOD)
        .to_string();

    let estimated_completion = lines.iter().filter_map(|l| l.estimated_completion).max();
    // Nothing to wash means nothing to queue.
    let fulfillment_status = if estimated_completion.is_none() {
        FulfillmentStatus::Completed
    } else {
        FulfillmentStatus::InQueue
    };

    let projected_points = points::order_points(
        lines
            .iter()
            .map(|l| (l.pricing_mode, l.quantity, l.weight_kg)),
    );

    Ok(OrderDraft {
        store_id,
        customer,
        lines,
        subtotal,
        discount,
        total,
        payment_method,
        amount_tendered,
        payment_status: PaymentStatus::from_tendered(total, amount_tendered),
        fulfillment_status,
        estimated_completion,
        projected_points,
    })
}

fn price_line(
    line: &OrderLineRequest,
    catalog: &HashMap<Uuid, ServiceDefinition>,
    now: DateTime<Utc>,
) -> AppResult<DraftLine> {
    match line {
        OrderLineRequest::Service {
            service_id,
            quantity,
            weight_kg,
        } => {
            let service = catalog.get(service_id).ok_or(AppError::NotFound)?;
            let mode = service.pricing_mode;

            let quantity = if mode.uses_quantity() {
                Some(positive("quantity", *quantity, MAX_QUANTITY)?)
            } else {
                None
            };
            let weight_kg = if mode.uses_weight() {
                Some(positive("weight_kg", *weight_kg, MAX_WEIGHT_KG)?)
            } else {
                None
            };
            let unit_price = if mode.uses_quantity() {
                Some(required_price(&service.name, "unit", service.unit_price)?)
            } else {
                None
            };
            let weight_price = if mode.uses_weight() {
                Some(required_price(&service.name, "weight", service.weight_price)?)
            } else {
                None
            };

            let line_total = pricing::line_total(
                mode,
                unit_price.unwrap_or(0),
                weight_price.unwrap_or(0),
                quantity.unwrap_or(0.0),
                weight_kg.unwrap_or(0.0),
            )
            .ok_or_else(|| too_large(&service.name))?;

            Ok(DraftLine {
                service_id: Some(service.id),
                name: service.name.clone(),
                pricing_mode: mode,
                quantity,
                weight_kg,
                unit_price,
                weight_price,
                line_total,
                estimated_completion: service
                    .duration
                    .map(|d| due_date(&service.name, d, now))
                    .transpose()?,
            })
        }
        OrderLineRequest::AdHoc {
            name,
            unit_price,
            quantity,
        } => {
            let name = name.trim();
            if name.is_empty() {
                return Err(AppError::BadRequest("Item name is required".into()));
            }
            if *unit_price < 0 {
                return Err(AppError::BadRequest(format!(
                    "Price of {name} must not be negative"
                )));
            }
            let quantity = positive("quantity", Some(*quantity), MAX_QUANTITY)?;
            let line_total = pricing::line_total(PricingMode::Unit, *unit_price, 0, quantity, 0.0)
                .ok_or_else(|| too_large(name))?;
            Ok(DraftLine {
                service_id: None,
                name: name.to_string(),
                pricing_mode: PricingMode::Unit,
                quantity: Some(quantity),
                weight_kg: None,
                unit_price: Some(*unit_price),
                weight_price: None,
                line_total,
                estimated_completion: None,
            })
        }
    }
}

fn positive(field: &str, value: Option<f64>, max: f64) -> AppResult<f64> {
    match value {
        Some(v) if v.is_finite() && v > 0.0 && v <= max => Ok(v),
        Some(v) if v > max => Err(AppError::BadRequest(format!("{field} must not exceed {max}"))),
        Some(_) => Err(AppError::BadRequest(format!("{field} must be positive"))),
        None => Err(AppError::BadRequest(format!("{field} is required"))),
    }
}

fn too_large(name: &str) -> AppError {
    AppError::BadRequest(format!("Line total of {name} is too large"))
}

fn due_date(name: &str, duration: ServiceDuration, now: DateTime<Utc>) -> AppResult<DateTime<Utc>> {
    if !duration.is_within_limit() {
        return Err(AppError::BadRequest(format!("Service {name} has an invalid duration")));
    }
    duration
        .due_from(now)
        .ok_or_else(|| AppError::BadRequest(format!("Service {name} has an invalid duration")))
}

fn required_price(service: &str, kind: &str, price: Option<i64>) -> AppResult<i64> {
    price.ok_or_else(|| AppError::BadRequest(format!("Service {service} has no {kind} price")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{domain::pricing::DurationUnit, dto::orders::CustomerInput};

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-03-02T09:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn service(mode: PricingMode, days: Option<i32>) -> ServiceDefinition {
        ServiceDefinition {
            id: Uuid::new_v4(),
            name: "Kiloan".into(),
            category: "laundry".into(),
            pricing_mode: mode,
            unit_price: Some(5_000),
            weight_price: Some(7_000),
            duration: days.map(|value| ServiceDuration {
                value,
                unit: DurationUnit::Days,
            }),
        }
    }

    fn catalog(services: &[ServiceDefinition]) -> HashMap<Uuid, ServiceDefinition> {
        services.iter().map(|s| (s.id, s.clone())).collect()
    }

    fn request(items: Vec<OrderLineRequest>) -> CreateOrderRequest {
        CreateOrderRequest {
            customer: CustomerInput {
                name: "Budi".into(),
                phone: "0812-3456-7890".into(),
                email: None,
                address: Some("  ".into()),
            },
            items,
            discount: None,
            payment_method: None,
            amount_tendered: None,
        }
    }

    fn weight_line(id: Uuid, kg: f64) -> OrderLineRequest {
        OrderLineRequest::Service {
            service_id: id,
            quantity: None,
            weight_kg: Some(kg),
        }
    }

    #[test]
    fn prices_weight_line_and_queues_it() {
        let kilo = service(PricingMode::Weight, Some(2));
        let draft = assemble(
            Uuid::new_v4(),
            &request(vec![weight_line(kilo.id, 2.3)]),
            &catalog(&[kilo]),
            now(),
        )
        .unwrap();

        assert_eq!(draft.customer.phone, "081234567890");
        assert_eq!(draft.customer.address, None);
        assert_eq!(draft.subtotal, 16_100);
        assert_eq!(draft.total, 16_100);
        assert_eq!(draft.payment_status, PaymentStatus::Pending);
        assert_eq!(draft.fulfillment_status, FulfillmentStatus::InQueue);
        assert_eq!(draft.projected_points, 2);
        assert_eq!(draft.payment_method, DEFAULT_PAYMENT_METHOD);
        assert_eq!(
            draft.estimated_completion.unwrap().to_rfc3339(),
            "2026-03-04T09:00:00+00:00"
        );
        assert_eq!(draft.lines[0].quantity, None);
        assert_eq!(draft.lines[0].unit_price, None);
    }

    #[test]
    fn order_completion_is_latest_line() {
        let quick = service(PricingMode::Unit, Some(1));
        let slow = service(PricingMode::Weight, Some(3));
        let items = vec![
            OrderLineRequest::Service {
                service_id: quick.id,
                quantity: Some(2.0),
                weight_kg: None,
            },
            weight_line(slow.id, 1.0),
        ];
        let draft =
            assemble(Uuid::new_v4(), &request(items), &catalog(&[quick, slow]), now()).unwrap();
        assert_eq!(
            draft.estimated_completion.unwrap().to_rfc3339(),
            "2026-03-05T09:00:00+00:00"
        );
    }

    #[test]
    fn products_only_order_starts_completed() {
        let soap = service(PricingMode::Unit, None);
        let items = vec![
            OrderLineRequest::Service {
                service_id: soap.id,
                quantity: Some(1.0),
                weight_kg: None,
            },
            OrderLineRequest::AdHoc {
                name: "Hanger".into(),
                unit_price: 1_500,
                quantity: 4.0,
            },
        ];
        let draft = assemble(Uuid::new_v4(), &request(items), &catalog(&[soap]), now()).unwrap();
        assert_eq!(draft.fulfillment_status, FulfillmentStatus::Completed);
        assert_eq!(draft.estimated_completion, None);
        assert_eq!(draft.subtotal, 5_000 + 6_000);
    }

    #[test]
    fn tendered_amount_sets_payment_status_and_change() {
        let kilo = service(PricingMode::Weight, Some(2));
        let cat = catalog(std::slice::from_ref(&kilo));

        let mut req = request(vec![weight_line(kilo.id, 2.0)]);
        req.amount_tendered = Some(5_000);
        let draft = assemble(Uuid::new_v4(), &req, &cat, now()).unwrap();
        assert_eq!(draft.payment_status, PaymentStatus::DownPayment);
        assert_eq!(draft.change_due(), 0);

        req.amount_tendered = Some(20_000);
        let draft = assemble(Uuid::new_v4(), &req, &cat, now()).unwrap();
        assert_eq!(draft.payment_status, PaymentStatus::Completed);
        assert_eq!(draft.change_due(), 6_000);
    }

    #[test]
    fn discount_is_bounded_by_subtotal() {
        let kilo = service(PricingMode::Weight, Some(2));
        let cat = catalog(std::slice::from_ref(&kilo));
        let mut req = request(vec![weight_line(kilo.id, 1.0)]);

        req.discount = Some(2_000);
        assert_eq!(assemble(Uuid::new_v4(), &req, &cat, now()).unwrap().total, 5_000);

        req.discount = Some(8_000);
        assert!(matches!(
            assemble(Uuid::new_v4(), &req, &cat, now()),
            Err(AppError::BadRequest(_))
        ));
        req.discount = Some(-1);
        assert!(assemble(Uuid::new_v4(), &req, &cat, now()).is_err());
    }

    #[test]
    fn rejects_malformed_orders() {
        let kilo = service(PricingMode::Weight, Some(2));
        let cat = catalog(std::slice::from_ref(&kilo));
        let store = Uuid::new_v4();

        assert!(matches!(
            assemble(store, &request(vec![]), &cat, now()),
            Err(AppError::BadRequest(_))
        ));
        assert!(assemble(store, &request(vec![weight_line(kilo.id, -1.0)]), &cat, now()).is_err());
        let nan = request(vec![weight_line(kilo.id, f64::NAN)]);
        assert!(assemble(store, &nan, &cat, now()).is_err());

        let mut nameless = request(vec![weight_line(kilo.id, 1.0)]);
        nameless.customer.name = "  ".into();
        assert!(assemble(store, &nameless, &cat, now()).is_err());

        let mut bad_phone = request(vec![weight_line(kilo.id, 1.0)]);
        bad_phone.customer.phone = "12".into();
        assert!(assemble(store, &bad_phone, &cat, now()).is_err());

        let ad_hoc = OrderLineRequest::AdHoc {
            name: "Bag".into(),
            unit_price: -10,
            quantity: 1.0,
        };
        assert!(assemble(store, &request(vec![ad_hoc]), &cat, now()).is_err());
    }

    #[test]
    fn unknown_service_is_not_found() {
        let result = assemble(
            Uuid::new_v4(),
            &request(vec![weight_line(Uuid::new_v4(), 1.0)]),
            &HashMap::new(),
            now(),
        );
        assert!(matches!(result, Err(AppError::NotFound)));
    }

    #[test]
    fn combined_line_charges_both_parts() {
        let combo = service(PricingMode::Combined, Some(1));
        let items = vec![OrderLineRequest::Service {
            service_id: combo.id,
            quantity: Some(2.0),
            weight_kg: Some(3.7),
        }];
        let draft = assemble(Uuid::new_v4(), &request(items), &catalog(&[combo]), now()).unwrap();
        assert_eq!(draft.subtotal, 10_000 + 25_900);
        assert_eq!(draft.projected_points, 6);
    }

    fn ad_hoc(unit_price: i64, quantity: f64) -> OrderLineRequest {
        OrderLineRequest::AdHoc {
            name: "Detergent".into(),
            unit_price,
            quantity,
        }
    }

    #[test]
    fn oversized_amounts_are_bad_requests() {
        let kilo = service(PricingMode::Weight, Some(2));
        let cat = catalog(std::slice::from_ref(&kilo));
        let store = Uuid::new_v4();
        let rejected = |items: Vec<OrderLineRequest>| {
            matches!(
                assemble(store, &request(items), &cat, now()),
                Err(AppError::BadRequest(_))
            )
        };

        assert!(rejected(vec![ad_hoc(10, 1e19), ad_hoc(10, 1e19)]));
        assert!(rejected(vec![ad_hoc(10, MAX_QUANTITY + 1.0)]));
        assert!(rejected(vec![weight_line(kilo.id, MAX_WEIGHT_KG + 0.5)]));
        assert!(rejected(vec![ad_hoc(i64::MAX, 2.0)]));
        assert!(rejected(vec![ad_hoc(i64::MAX / 2, 1.5), ad_hoc(i64::MAX / 2, 1.5)]));

        let heaviest = request(vec![weight_line(kilo.id, MAX_WEIGHT_KG)]);
        let draft = assemble(store, &heaviest, &cat, now()).unwrap();
        assert_eq!(draft.subtotal, 7_000_000);
    }

    #[test]
    fn out_of_range_duration_is_a_bad_request() {
        let forever = service(PricingMode::Weight, Some(i32::MAX));
        let result = assemble(
            Uuid::new_v4(),
            &request(vec![weight_line(forever.id, 1.0)]),
            &catalog(std::slice::from_ref(&forever)),
            now(),
        );
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }
}
