pub mod data {
    pub mod datasources {
        pub mod app_store_receipt_validator;
    }
    pub(crate) mod models {
        pub(crate) mod app_store_receipt {
            pub(crate) mod receipt_info_model;
            pub(crate) mod receipt_item_model;
            pub(crate) mod verify_receipt_request_model;
        }
    }
}

pub mod domain {
    pub mod entities {
        pub mod product;
        pub mod purchase;
        pub mod receipt;
        pub mod transaction;
        pub mod verify_result;
    }
    pub mod repositories {
        pub mod payment_queue;
        pub mod products_request;
        pub mod receipt_refresher;
        pub mod receipt_validator;
    }
    pub mod services {
        pub mod entitlement_evaluator;
    }
}

pub(crate) mod controllers {
    pub(crate) mod complete_transactions_controller;
    pub(crate) mod payment_queue_controller;
    pub(crate) mod payments_controller;
    pub(crate) mod products_info_controller;
    pub(crate) mod receipt_verificator;
    pub(crate) mod restore_purchases_controller;
    pub(crate) mod transaction_controller;

    #[cfg(test)]
    pub(crate) mod test_support;
}

pub mod config;
pub mod constants;
pub mod errors;
pub mod secrets;
pub mod util;
