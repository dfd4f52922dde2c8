use fractic_env_config::{define_secret_key, define_secrets_config, SecretsConfigEnum};

define_secret_key!(APP_STORE_SHARED_SECRET);

define_secrets_config!(
    PurchaseKitSecretsConfig,
    AppStoreSharedSecret => APP_STORE_SHARED_SECRET,
);
