use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    domain::{
        pricing::{DurationUnit, PricingMode, ServiceDuration},
        status::{FulfillmentStatus, PaymentStatus},
    },
    dto::{
        catalog::{CreateServiceRequest, ServiceList},
        customers::{CustomerList, LapsedCustomer, LapsedCustomerList},
        loyalty::{
            PointTransactionList, PointsBalance, Reconciliation, RedeemPointsRequest,
            RedemptionResult,
        },
        orders::{
            CreateOrderRequest, CustomerInput, NotificationResult, OrderLineRequest, OrderList,
            OrderOutcome, OrderWithItems, PickupEstimate, Receipt, ReceiptLine,
            RecordPaymentRequest, ReminderSummary, ResendNotificationRequest, StoreContact,
            UpdateFulfillmentRequest, UpdatePaymentRequest,
        },
        stores::{CurrentStore, UpdateStoreSettingsRequest},
    },
    entity::{point_transactions::PointKind, store_members::MemberRole},
    models::{Customer, Order, OrderItem, PointTransaction, PointsAccount, Service, Store},
    notify::{DispatchStatus, NotificationKind},
    response::{ApiResponse, Meta},
    routes::{catalog, customers, health, orders, params, stores},
    services::ledger::CreditOutcome,
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        stores::current_store,
        stores::update_settings,
        catalog::list_services,
        catalog::create_service,
        catalog::get_service,
        catalog::deactivate_service,
        customers::search_customers,
        customers::inactive_customers,
        customers::churned_customers,
        customers::upsert_customer,
        customers::get_customer,
        customers::order_history,
        customers::points_balance,
        customers::point_transactions,
        customers::redeem_points,
        customers::reconcile_points,
        orders::list_orders,
        orders::create_order,
        orders::list_todays_orders,
        orders::list_ready_for_pickup,
        orders::list_pending_payments,
        orders::send_payment_reminders,
        orders::get_order,
        orders::get_receipt,
        orders::estimate_pickup,
        orders::update_fulfillment,
        orders::update_payment_status,
        orders::record_payment,
        orders::resend_notification
    ),
    components(
        schemas(
            Store,
            Customer,
            Service,
            Order,
            OrderItem,
            PointsAccount,
            PointTransaction,
            PricingMode,
            DurationUnit,
            ServiceDuration,
            FulfillmentStatus,
            PaymentStatus,
            PointKind,
            MemberRole,
            CreditOutcome,
            NotificationKind,
            DispatchStatus,
            CurrentStore,
            UpdateStoreSettingsRequest,
            CreateServiceRequest,
            ServiceList,
            CustomerInput,
            CustomerList,
            CreateOrderRequest,
            OrderLineRequest,
            UpdateFulfillmentRequest,
            UpdatePaymentRequest,
            RecordPaymentRequest,
            ResendNotificationRequest,
            OrderList,
            OrderWithItems,
            OrderOutcome,
            NotificationResult,
            ReminderSummary,
            Receipt,
            ReceiptLine,
            PickupEstimate,
            LapsedCustomer,
            LapsedCustomerList,
            StoreContact,
            PointsBalance,
            PointTransactionList,
            RedeemPointsRequest,
            RedemptionResult,
            Reconciliation,
            params::Pagination,
            params::OrderListQuery,
            params::PendingPaymentsQuery,
            params::TodaysOrdersQuery,
            params::InactivityQuery,
            params::ServiceQuery,
            params::CustomerQuery,
            Meta,
            ApiResponse<OrderOutcome>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderList>,
            ApiResponse<Receipt>,
            ApiResponse<ServiceList>,
            ApiResponse<CustomerList>,
            ApiResponse<LapsedCustomerList>,
            ApiResponse<PickupEstimate>,
            ApiResponse<PointsBalance>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Stores", description = "Current store context and settings"),
        (name = "Services", description = "Service catalog"),
        (name = "Customers", description = "Customer records"),
        (name = "Orders", description = "Order lifecycle"),
        (name = "Loyalty", description = "Points balances and redemption"),
        (name = "Notifications", description = "Customer messages"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
