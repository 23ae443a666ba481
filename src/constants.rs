use std::collections::HashSet;
use std::time::Duration;

use once_cell::sync::Lazy;

// Env values used in aliyun services.
pub const ALIBABA_CLOUD_ACCESS_KEY_ID: &str = "ALIBABA_CLOUD_ACCESS_KEY_ID";
pub const ALIBABA_CLOUD_ACCESS_KEY_SECRET: &str = "ALIBABA_CLOUD_ACCESS_KEY_SECRET";
pub const ALIBABA_CLOUD_SECURITY_TOKEN: &str = "ALIBABA_CLOUD_SECURITY_TOKEN";
pub const OSS_ENDPOINT: &str = "OSS_ENDPOINT";

pub const DEFAULT_ENDPOINT: &str = "oss-cn-hangzhou.aliyuncs.com";

/// Headers with this prefix participate in canonicalization; all others
/// are sent with the request but excluded from signing.
pub const OSS_HEADER_PREFIX: &str = "x-oss-";

pub const DEFAULT_PRESIGN_EXPIRES_IN: Duration = Duration::from_secs(3600);
pub const DEFAULT_POLICY_EXPIRES_IN: Duration = Duration::from_secs(3600);

pub fn is_sub_resource(v: &str) -> bool {
    SUB_RESOURCES.contains(v)
}

/// Object-level subset of the sub-resource list from
/// <https://github.com/aliyun/aliyun-oss-go-sdk/blob/master/oss/conn.go>
static SUB_RESOURCES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        "acl",
        "append",
        "callback",
        "callback-var",
        "objectMeta",
        "position",
        "response-cache-control",
        "response-content-disposition",
        "response-content-encoding",
        "response-content-language",
        "response-content-type",
        "response-expires",
        "restore",
        "security-token",
        "symlink",
        "tagging",
        "versionId",
        "x-oss-process",
        "x-oss-traffic-limit",
    ])
});
