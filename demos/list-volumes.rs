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

use serde::Deserialize;

use osroute::services::BLOCK_STORAGE;
use osroute::{CancellationToken, Page, Resource};

#[derive(Debug, Deserialize, Resource)]
pub struct Volume {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let max_pages: usize = env::args()
        .nth(1)
        .map(|s| s.parse().expect("Expected a number"))
        .unwrap_or(usize::MAX);

    let token = env::var("OS_TOKEN").expect("OS_TOKEN is required");
    let body = fs::read_to_string(env::var("OS_TOKEN_BODY").expect("OS_TOKEN_BODY is required"))
        .expect("Cannot read the token body");
    let auth = osroute::TokenAuth::from_token_body(token, &body).expect("Invalid token body");
    let defaults = osroute::EndpointDefaults::from_env().expect("Invalid environment");
    let session = osroute::Session::new(auth).with_defaults(defaults);

    let mut pager = session
        .linked_pager::<Volume, _, _>(BLOCK_STORAGE, &["volumes"])
        .await
        .expect("Cannot find the block storage endpoint")
        .with_query(&[("limit", 20)])
        .expect("Invalid query")
        .with_cancellation(CancellationToken::new());

    let mut seen = 0;
    pager
        .each_page(|page| {
            seen += 1;
            for volume in page.items() {
                println!(
                    "ID = {}, Name = {}",
                    volume.id,
                    volume.name.as_deref().unwrap_or("")
                );
            }
            Ok(seen < max_pages)
        })
        .await
        .expect("Failed to list volumes");
    println!("Visited {} page(s)", seen);
}
