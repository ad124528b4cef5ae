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

use reqwest::Url;

use osroute::services::COMPUTE;
use osroute::{Client, VersionCandidate};

#[tokio::main]
async fn main() {
    env_logger::init();
    let endpoint = env::args()
        .nth(1)
        .expect("Expected a compute endpoint, e.g. http://cloud/compute");
    let base = Url::parse(&endpoint).expect("Invalid URL");

    let candidates = vec![
        VersionCandidate::new("v2.0", 1, "/v2"),
        VersionCandidate::new("v2.1", 2, "/v2.1"),
    ];
    let (chosen, url) =
        osroute::choose_version(&Client::new_without_auth(), &base, None, &candidates)
            .await
            .expect("Version negotiation failed");
    println!("Using version {} at {}", chosen.id, url);

    let session = osroute::Session::new(osroute::NoAuth::new(url).expect("Invalid URL"));
    match session
        .supported_microversions(COMPUTE)
        .await
        .expect("Version discovery failed")
    {
        Some(range) => println!("Microversions: {}", range),
        None => println!("Microversions are not supported"),
    }
}
