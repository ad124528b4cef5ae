// Copyright 2019 Dmitry Tantsur <dtantsur@protonmail.com>
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.


use std::env;
use std::fs;

use osroute::{Catalog, Client, EndpointOpts};

#[tokio::main]
async fn main() {
    env_logger::init();
    let mut args = env::args().skip(1);
    let path = args
        .next()
        .expect("Expected a path to a token or access JSON body");
    let service_type = args.next().expect("Expected a service type");
    let version: u16 = args
        .next()
        .map(|s| s.parse().expect("Expected a major version"))
        .unwrap_or(0);

    let body = fs::read_to_string(path).expect("Cannot read the catalog");
    let catalog: Catalog = serde_json::from_str(&body).expect("Invalid catalog");
    let opts = osroute::EndpointDefaults::from_env()
        .expect("Invalid environment")
        .apply(EndpointOpts::new(service_type).with_version(version));

    let endpoint = catalog
        .resolve(&opts, &Client::new_without_auth())
        .await
        .expect("Cannot resolve the endpoint");
    println!("{}", endpoint);
}
