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

use futures::pin_mut;
use futures::stream::TryStreamExt;
use serde::Deserialize;

use osroute::services::COMPUTE;
use osroute::{Query, QueryItem, Resource};

#[derive(Debug, Deserialize, Resource)]
pub struct Server {
    #[resource_id]
    pub id: String,
    pub name: String,
}

#[derive(Debug, QueryItem)]
pub enum ServerFilter {
    Status(String),
    Limit(usize),
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let limit: usize = env::args()
        .nth(1)
        .map(|s| s.parse().expect("Expected a number"))
        .unwrap_or(10);
    let mut query = Query::default().with(ServerFilter::Limit(limit));
    if let Some(status) = env::args().nth(2) {
        query.push(ServerFilter::Status(status));
    }

    let token = env::var("OS_TOKEN").expect("OS_TOKEN is required");
    let body = fs::read_to_string(env::var("OS_TOKEN_BODY").expect("OS_TOKEN_BODY is required"))
        .expect("Cannot read the token body");
    let auth = osroute::TokenAuth::from_token_body(token, &body).expect("Invalid token body");
    let defaults = osroute::EndpointDefaults::from_env().expect("Invalid environment");
    let session = osroute::Session::new(auth).with_defaults(defaults);

    let sstream = session
        .marker_pager::<Server, _, _>(COMPUTE, &["servers"])
        .await
        .expect("Cannot find the compute endpoint")
        .with_query(&query)
        .expect("Invalid query")
        .into_stream();
    pin_mut!(sstream);
    while let Some(srv) = sstream
        .try_next()
        .await
        .expect("Failed to fetch the next page")
    {
        println!("ID = {}, Name = {}", srv.id, srv.name);
    }
    println!("Done listing");
}
