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
    domain::{DeliveryStatus, OrderStatus, PaymentMethod, PaymentStatus, Role},
    dto::{
        auth::{Claims, LoginRequest, LoginResponse, RegisterRequest},
        deliveries::{
            AssignDeliveryRequest, CreateDeliveryRequest, DeliveryList, UpdateDeliveryStatusRequest,
            UpdateEstimatedTimeRequest, UpdateLocationRequest, UpdateNotesRequest,
        },
        menu::{
            CategoryList, CreateMenuItemRequest, MenuItemList, UpdateAvailabilityRequest,
            UpdateMenuItemRequest,
        },
        orders::{
            CreateOrderItemRequest, CreateOrderRequest, OrderList, OrderWithItems,
            UpdateOrderStatusRequest,
        },
        payments::{
            CardPaymentRequest, CashPaymentRequest, ExpiredSweepResult, PaymentList, PaymentStats,
            RefundRequest, UpdatePaymentStatusRequest,
        },
        restaurants::{
            CreateRestaurantRequest, RestaurantList, UpdateRatingRequest, UpdateRestaurantRequest,
        },
        users::{ChangePasswordRequest, UpdateProfileRequest, UserList},
    },
    models::{Delivery, MenuItem, Order, OrderItem, Payment, Restaurant, User},
    response::{ApiResponse, Meta},
    routes::{admin, auth, deliveries, health, menu, orders, params, payments, restaurants, users},
    services::admin_service::UserStats,
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
        auth::register,
        auth::login,
        auth::validate,
        users::get_profile,
        users::update_profile,
        users::change_password,
        users::get_user,
        restaurants::create_restaurant,
        restaurants::list_restaurants,
        restaurants::my_restaurants,
        restaurants::restaurants_by_owner,
        restaurants::restaurants_by_cuisine,
        restaurants::search_restaurants,
        restaurants::top_rated,
        restaurants::get_restaurant,
        restaurants::update_restaurant,
        restaurants::update_rating,
        restaurants::approve_restaurant,
        restaurants::reject_restaurant,
        menu::create_menu_item,
        menu::get_menu_item,
        menu::menu_by_restaurant,
        menu::full_menu_by_restaurant,
        menu::menu_by_category,
        menu::categories,
        menu::search_menu_items,
        menu::update_menu_item,
        menu::update_availability,
        menu::delete_menu_item,
        orders::create_order,
        orders::my_orders,
        orders::orders_by_customer,
        orders::orders_by_restaurant,
        orders::active_orders_by_restaurant,
        orders::orders_by_status,
        orders::get_order,
        orders::update_order_status,
        orders::cancel_order,
        orders::attach_delivery,
        orders::attach_payment,
        deliveries::create_delivery,
        deliveries::track_delivery,
        deliveries::delivery_by_order,
        deliveries::my_deliveries,
        deliveries::my_active_deliveries,
        deliveries::pending_deliveries,
        deliveries::unassigned_deliveries,
        deliveries::optimal_deliveries,
        deliveries::get_delivery,
        deliveries::assign_delivery,
        deliveries::accept_delivery,
        deliveries::update_delivery_status,
        deliveries::update_location,
        deliveries::update_estimated_time,
        deliveries::update_notes,
        deliveries::cancel_delivery,
        payments::create_card_payment,
        payments::create_cash_payment,
        payments::confirm_cash_payment,
        payments::get_payment,
        payments::payment_by_order,
        payments::my_payments,
        payments::payments_by_customer,
        payments::payments_by_status,
        payments::refund_payment,
        payments::update_payment_status,
        payments::payment_stats,
        payments::process_expired,
        admin::list_users,
        admin::users_by_role,
        admin::active_users,
        admin::search_users,
        admin::activate_user,
        admin::deactivate_user,
        admin::user_stats
    ),
    components(
        schemas(
            Role,
            OrderStatus,
            DeliveryStatus,
            PaymentStatus,
            PaymentMethod,
            User,
            Restaurant,
            MenuItem,
            Order,
            OrderItem,
            Delivery,
            Payment,
            Claims,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            UpdateProfileRequest,
            ChangePasswordRequest,
            UserList,
            CreateRestaurantRequest,
            UpdateRestaurantRequest,
            UpdateRatingRequest,
            RestaurantList,
            CreateMenuItemRequest,
            UpdateMenuItemRequest,
            UpdateAvailabilityRequest,
            MenuItemList,
            CategoryList,
            CreateOrderRequest,
            CreateOrderItemRequest,
            UpdateOrderStatusRequest,
            OrderList,
            OrderWithItems,
            CreateDeliveryRequest,
            AssignDeliveryRequest,
            UpdateDeliveryStatusRequest,
            UpdateLocationRequest,
            UpdateEstimatedTimeRequest,
            UpdateNotesRequest,
            DeliveryList,
            CardPaymentRequest,
            CashPaymentRequest,
            RefundRequest,
            UpdatePaymentStatusRequest,
            PaymentList,
            PaymentStats,
            ExpiredSweepResult,
            UserStats,
            params::Pagination,
            params::OrderListQuery,
            params::NameQuery,
            Meta,
            ApiResponse<User>,
            ApiResponse<Restaurant>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderList>,
            ApiResponse<Delivery>,
            ApiResponse<Payment>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Authentication endpoints"),
        (name = "Users", description = "Profile endpoints"),
        (name = "Restaurants", description = "Restaurant endpoints"),
        (name = "Menu", description = "Menu endpoints"),
        (name = "Orders", description = "Order endpoints"),
        (name = "Deliveries", description = "Delivery endpoints"),
        (name = "Payments", description = "Payment endpoints"),
        (name = "Admin", description = "User administration endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
