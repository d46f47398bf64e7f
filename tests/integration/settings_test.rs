// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sitecheck::config::settings::{ColumnRef, Settings};
use sitecheck::domain::models::site::SiteProfile;

#[test]
fn test_shipped_default_config_is_valid() {
    let contents = std::fs::read_to_string(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/config/default.toml"
    ))
    .unwrap();
    let settings = Settings::from_file_contents(&contents).unwrap();

    assert_eq!(settings.input.columns.original_url, ColumnRef::Index(0));
    assert_eq!(settings.input.columns.status_code, ColumnRef::Index(3));
    assert_eq!(settings.input.columns.expected_url, ColumnRef::Index(60));
    assert_eq!(settings.input.removal_marker, "REMOVE");

    let profile = SiteProfile::from_settings(&settings.site).unwrap();
    assert_eq!(profile.base_url(), "https://qa-www.example.com");
    assert_eq!(profile.production_host(), "www.example.com");
    assert!(!profile.is_production());
}
