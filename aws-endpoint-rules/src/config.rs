/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Client configuration that feeds built-in endpoint parameters.

use crate::os_shim_internal::Env;
use crate::parameters::BuiltIn;
use crate::value::Value;
use std::borrow::Cow;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

const ENV_REGION: &str = "AWS_REGION";
const ENV_USE_FIPS: &str = "AWS_USE_FIPS_ENDPOINT";
const ENV_USE_DUAL_STACK: &str = "AWS_USE_DUALSTACK_ENDPOINT";
const ENV_ENDPOINT_URL: &str = "AWS_ENDPOINT_URL";
const ENV_ACCOUNT_ID: &str = "AWS_ACCOUNT_ID";
const ENV_ACCOUNT_ID_ENDPOINT_MODE: &str = "AWS_ACCOUNT_ID_ENDPOINT_MODE";

/// The region to send requests to.
///
/// A full list of regions is found in the "Regions and Endpoints" document:
/// <http://docs.aws.amazon.com/general/latest/gr/rande.html>
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Region(
    // Regions are almost always known statically. However, as an escape hatch for when they
    // are not, allow for an owned region
    Cow<'static, str>,
);

impl AsRef<str> for Region {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for Region {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Region {
    /// Creates a region from an owned or static string.
    pub fn new(region: impl Into<Cow<'static, str>>) -> Self {
        Self(region.into())
    }

    /// Creates a region from a static string.
    pub const fn from_static(region: &'static str) -> Self {
        Self(Cow::Borrowed(region))
    }
}

/// Whether endpoints may embed the caller's account ID.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccountIdEndpointMode {
    /// Use account-based endpoints when an account ID is available
    Preferred,
    /// Never use account-based endpoints
    Disabled,
    /// Fail when no account ID is available
    Required,
}

impl AccountIdEndpointMode {
    /// The value used in configuration and rule sets
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountIdEndpointMode::Preferred => "preferred",
            AccountIdEndpointMode::Disabled => "disabled",
            AccountIdEndpointMode::Required => "required",
        }
    }
}

impl FromStr for AccountIdEndpointMode {
    type Err = InvalidConfigValue;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "preferred" => Ok(AccountIdEndpointMode::Preferred),
            "disabled" => Ok(AccountIdEndpointMode::Disabled),
            "required" => Ok(AccountIdEndpointMode::Required),
            _ => Err(InvalidConfigValue {
                key: ENV_ACCOUNT_ID_ENDPOINT_MODE,
                value: value.to_string(),
                expected: "one of `preferred`, `disabled` or `required`",
            }),
        }
    }
}

/// A configuration value could not be parsed.
#[derive(Debug, thiserror::Error)]
#[error("invalid value `{value}` for {key}: expected {expected}")]
pub struct InvalidConfigValue {
    key: &'static str,
    value: String,
    expected: &'static str,
}

/// Values of built-in endpoint parameters.
///
/// Unset fields leave the corresponding parameters to their rule set defaults.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EndpointConfig {
    region: Option<Region>,
    use_fips: Option<bool>,
    use_dual_stack: Option<bool>,
    endpoint_url: Option<String>,
    account_id: Option<String>,
    account_id_endpoint_mode: Option<AccountIdEndpointMode>,
    accelerate: Option<bool>,
    force_path_style: Option<bool>,
    use_arn_region: Option<bool>,
    disable_multi_region_access_points: Option<bool>,
    use_global_endpoint: Option<bool>,
}

impl EndpointConfig {
    /// Creates a builder for an [`EndpointConfig`].
    pub fn builder() -> Builder {
        Builder::default()
    }

    /// Loads configuration from environment variables.
    ///
    /// Reads `AWS_REGION`, `AWS_USE_FIPS_ENDPOINT`, `AWS_USE_DUALSTACK_ENDPOINT`,
    /// `AWS_ENDPOINT_URL`, `AWS_ACCOUNT_ID` and `AWS_ACCOUNT_ID_ENDPOINT_MODE`.
    pub fn from_env(env: &Env) -> Result<Self, InvalidConfigValue> {
        let var = |key: &'static str| env.get(key).ok().filter(|value| !value.is_empty());
        let flag = |key: &'static str| var(key).map(|value| parse_bool(key, &value)).transpose();
        Ok(Builder::default()
            .set_region(var(ENV_REGION).map(Region::new))
            .set_use_fips(flag(ENV_USE_FIPS)?)
            .set_use_dual_stack(flag(ENV_USE_DUAL_STACK)?)
            .set_endpoint_url(var(ENV_ENDPOINT_URL))
            .set_account_id(var(ENV_ACCOUNT_ID))
            .set_account_id_endpoint_mode(
                var(ENV_ACCOUNT_ID_ENDPOINT_MODE)
                    .map(|mode| mode.parse::<AccountIdEndpointMode>())
                    .transpose()?,
            )
            .build())
    }

    /// The configured region
    pub fn region(&self) -> Option<&Region> {
        self.region.as_ref()
    }

    /// Whether FIPS endpoints were requested
    pub fn use_fips(&self) -> Option<bool> {
        self.use_fips
    }

    /// Whether dual-stack endpoints were requested
    pub fn use_dual_stack(&self) -> Option<bool> {
        self.use_dual_stack
    }

    /// Custom endpoint URL
    pub fn endpoint_url(&self) -> Option<&str> {
        self.endpoint_url.as_deref()
    }

    /// Account ID used for account-based endpoints
    pub fn account_id(&self) -> Option<&str> {
        self.account_id.as_deref()
    }

    /// Account-based endpoint mode
    pub fn account_id_endpoint_mode(&self) -> Option<AccountIdEndpointMode> {
        self.account_id_endpoint_mode
    }

    /// The value of a built-in parameter, if configured
    pub fn built_in_value(&self, built_in: &BuiltIn) -> Option<Value> {
        let flag = |flag: Option<bool>| flag.map(Value::Bool);
        match built_in {
            BuiltIn::Region => self.region.as_ref().map(|r| Value::from(r.as_ref())),
            BuiltIn::UseFips => flag(self.use_fips),
            BuiltIn::UseDualStack => flag(self.use_dual_stack),
            BuiltIn::Endpoint => self.endpoint_url.as_deref().map(Value::from),
            BuiltIn::AccountId => self.account_id.as_deref().map(Value::from),
            BuiltIn::AccountIdEndpointMode => self
                .account_id_endpoint_mode
                .map(|mode| Value::from(mode.as_str())),
            BuiltIn::S3Accelerate => flag(self.accelerate),
            BuiltIn::S3ForcePathStyle => flag(self.force_path_style),
            BuiltIn::S3UseArnRegion | BuiltIn::S3ControlUseArnRegion => flag(self.use_arn_region),
            BuiltIn::S3DisableMultiRegionAccessPoints => {
                flag(self.disable_multi_region_access_points)
            }
            BuiltIn::S3UseGlobalEndpoint | BuiltIn::StsUseGlobalEndpoint => {
                flag(self.use_global_endpoint)
            }
            BuiltIn::Other(tag) => {
                tracing::debug!(built_in = %tag, "no configuration source for built-in");
                None
            }
        }
    }
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, InvalidConfigValue> {
    if value.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if value.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(InvalidConfigValue {
            key,
            value: value.to_string(),
            expected: "`true` or `false`",
        })
    }
}

/// Builder for [`EndpointConfig`]
#[derive(Clone, Debug, Default)]
pub struct Builder {
    inner: EndpointConfig,
}

macro_rules! setters {
    ($($(#[$doc:meta])* $field:ident, $set:ident: $ty:ty;)*) => {
        $(
            $(#[$doc])*
            pub fn $field(mut self, value: impl Into<$ty>) -> Self {
                self.inner.$field = Some(value.into());
                self
            }

            $(#[$doc])*
            pub fn $set(mut self, value: Option<$ty>) -> Self {
                self.inner.$field = value;
                self
            }
        )*
    };
}

impl Builder {
    setters! {
        /// Sets the region (`AWS::Region`).
        region, set_region: Region;
        /// Requests FIPS endpoints (`AWS::UseFIPS`).
        use_fips, set_use_fips: bool;
        /// Requests dual-stack endpoints (`AWS::UseDualStack`).
        use_dual_stack, set_use_dual_stack: bool;
        /// Sets a custom endpoint URL (`SDK::Endpoint`).
        endpoint_url, set_endpoint_url: String;
        /// Sets the account ID (`AWS::Auth::AccountId`).
        account_id, set_account_id: String;
        /// Sets the account-based endpoint mode (`AWS::Auth::AccountIdEndpointMode`).
        account_id_endpoint_mode, set_account_id_endpoint_mode: AccountIdEndpointMode;
        /// Requests S3 transfer acceleration (`AWS::S3::Accelerate`).
        accelerate, set_accelerate: bool;
        /// Forces path-style S3 addressing (`AWS::S3::ForcePathStyle`).
        force_path_style, set_force_path_style: bool;
        /// Lets ARNs override the configured region (`AWS::S3::UseArnRegion`,
        /// `AWS::S3Control::UseArnRegion`).
        use_arn_region, set_use_arn_region: bool;
        /// Disables S3 multi-region access points (`AWS::S3::DisableMultiRegionAccessPoints`).
        disable_multi_region_access_points, set_disable_multi_region_access_points: bool;
        /// Uses global endpoints for legacy global services (`AWS::S3::UseGlobalEndpoint`,
        /// `AWS::STS::UseGlobalEndpoint`).
        use_global_endpoint, set_use_global_endpoint: bool;
    }

    /// Constructs the [`EndpointConfig`].
    pub fn build(self) -> EndpointConfig {
        self.inner
    }
}
