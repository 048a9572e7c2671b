//! Unmarshal derive - error cases.

use keystone_config::Unmarshal;

#[derive(Default, Unmarshal)]
struct UnknownArgument {
    #[config(rename = "host_name")]
    host: String,
}

fn main() {}
