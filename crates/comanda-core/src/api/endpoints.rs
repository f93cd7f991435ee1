//! Endpoint paths for every backend, fixed at build time.
//!
//! Paths are relative to the owning backend's base address; entity ids are
//! substituted by the helpers below.

pub mod identity {
    pub const LOGIN: &str = "/api/auth/login/";
    pub const LOGOUT: &str = "/api/auth/logout/";
    pub const REFRESH: &str = "/api/auth/refresh/";
    pub const REGISTER: &str = "/api/auth/register/";
    pub const PROFILE: &str = "/api/auth/profile/";
    pub const CHANGE_PASSWORD: &str = "/api/auth/change-password/";
    pub const VALIDATE: &str = "/api/auth/validate/";
    pub const ROLES: &str = "/api/auth/roles/";
    pub const USERS: &str = "/api/auth/users/";
}

pub mod operations {
    pub const PRODUCTS: &str = "/api/inventory/products/";
    pub const CATEGORIES: &str = "/api/inventory/categories/";
    pub const PURCHASES: &str = "/api/inventory/purchases/";
    pub const SUPPLIERS: &str = "/api/suppliers/suppliers/";
    pub const RECIPES: &str = "/api/recipes/recipes/";

    pub fn product(id: u64) -> String {
        format!("{PRODUCTS}{id}/")
    }

    pub fn product_adjust_stock(id: u64) -> String {
        format!("{PRODUCTS}{id}/adjust_stock/")
    }

    pub fn supplier(id: u64) -> String {
        format!("{SUPPLIERS}{id}/")
    }

    pub fn recipe(id: u64) -> String {
        format!("{RECIPES}{id}/")
    }
}

pub mod pos {
    pub const MENU_CATEGORIES: &str = "/api/menu/categories/";
    pub const MENU_ITEMS: &str = "/api/menu/items/";
    pub const MENU_ITEMS_AVAILABLE: &str = "/api/menu/items/available/";
    pub const ZONES: &str = "/api/zones/";
    pub const TABLES: &str = "/api/tables/";
    pub const TABLES_STATUS_SUMMARY: &str = "/api/tables/status_summary/";
    pub const ORDERS: &str = "/api/orders/orders/";
    pub const ORDERS_KDS: &str = "/api/orders/orders/kds/";
    pub const ORDERS_DAILY_SUMMARY: &str = "/api/orders/orders/daily_summary/";

    pub fn menu_item(id: u64) -> String {
        format!("{MENU_ITEMS}{id}/")
    }

    pub fn menu_item_recalculate_cost(id: u64) -> String {
        format!("{MENU_ITEMS}{id}/recalculate_cost/")
    }

    pub fn table_update_status(id: u64) -> String {
        format!("{TABLES}{id}/update_status/")
    }

    pub fn order_change_status(id: u64) -> String {
        format!("{ORDERS}{id}/change_status/")
    }

    pub fn order_add_item(id: u64) -> String {
        format!("{ORDERS}{id}/add_item/")
    }

    pub fn order_add_payment(id: u64) -> String {
        format!("{ORDERS}{id}/add_payment/")
    }
}
