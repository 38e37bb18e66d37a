//! Loads a small campaign export from disk.

use chrono::{Duration, NaiveDate};
use helios_core::config::DataConfig;
use helios_core::error::HeliosError;
use helios_core::types::InfluencerId;
use helios_loader::{CsvDirectorySource, DataLoader, DatasetCache};
use std::fs;
use std::path::Path;

fn write_fixture(dir: &Path) {
    fs::write(
        dir.join("influencers.csv"),
        "influencer_id,name,platform,persona,follower_count\n\
         1,Asha,Instagram,Fitness,120000\n\
         2,Ravi,YouTube,Bodybuilding,56000\n",
    )
    .unwrap();
    fs::write(
        dir.join("posts.csv"),
        "post_id,influencer_id,platform,date,url,caption,reach,likes,comments\n\
         p1,1,Instagram,2025-06-01,https://x/p1,\"Leg day, again\",9000,340,12\n\
         p2,2,YouTube,2025-06-02,https://x/p2,Protein review,15000,800,40\n",
    )
    .unwrap();
    fs::write(
        dir.join("tracking_data.csv"),
        "source,campaign,influencer_id,user_id,product,date,orders,revenue\n\
         influencer_campaign,summer,1,u1,whey,2025-06-01,1,1500\n\
         organic,,,u2,whey,2025-06-01,1,500\n\
         influencer_campaign,summer,2,u3,creatine,2025-06-02,2,800.25\n",
    )
    .unwrap();
    fs::write(
        dir.join("payouts.csv"),
        "influencer_id,basis,rate,orders,total_payout\n\
         1,post,1000,,1000\n\
         2,order,50,2,100\n",
    )
    .unwrap();
}

#[test]
fn test_load_csv_directory() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path());

    let ds = DataLoader::new(CsvDirectorySource::in_dir(dir.path()))
        .load()
        .unwrap();

    assert_eq!(ds.influencers.len(), 2);
    assert_eq!(ds.posts.len(), 2);
    assert_eq!(ds.tracking.len(), 3);
    assert_eq!(ds.payouts.len(), 2);

    assert_eq!(ds.tracking[1].influencer_id, None);
    assert_eq!(ds.tracking[1].source, "organic");
    assert!((ds.tracking[2].revenue - 800.25).abs() < 1e-9);
    assert_eq!(
        ds.tracking[2].date,
        NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
    );

    let post = &ds.posts[0];
    assert_eq!(post.influencer_id, Some(InfluencerId::from("1")));
    assert_eq!(post.platform.as_deref(), Some("Instagram"));
    assert_eq!(post.engagement.get("reach"), Some(&9000.0));
    assert!(!post.engagement.contains_key("url"));

    assert_eq!(ds.platforms(), vec!["Instagram", "YouTube"]);
}

#[test]
fn test_custom_file_names() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path());
    fs::rename(
        dir.path().join("tracking_data.csv"),
        dir.path().join("events.csv"),
    )
    .unwrap();

    let config = DataConfig {
        dir: dir.path().to_path_buf(),
        tracking_file: "events.csv".into(),
        ..DataConfig::default()
    };
    let ds = DataLoader::new(CsvDirectorySource::new(&config))
        .load()
        .unwrap();
    assert_eq!(ds.tracking.len(), 3);
}

#[test]
fn test_missing_payouts_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path());
    fs::remove_file(dir.path().join("payouts.csv")).unwrap();

    let cache = DatasetCache::new(CsvDirectorySource::in_dir(dir.path()), Duration::hours(1));
    let err = cache.load().unwrap_err();
    assert!(matches!(err, HeliosError::DataUnavailable { ref table, .. } if table == "payouts"));
    assert!(err.is_fatal());
    assert!(cache.last_refreshed().is_none());
}

#[test]
fn test_refresh_picks_up_new_rows() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path());
    let cache = DatasetCache::new(CsvDirectorySource::in_dir(dir.path()), Duration::hours(1));
    assert_eq!(cache.load().unwrap().tracking.len(), 3);

    let mut tracking = fs::read_to_string(dir.path().join("tracking_data.csv")).unwrap();
    tracking.push_str("organic,,,u9,whey,2025-06-03,1,75\n");
    fs::write(dir.path().join("tracking_data.csv"), tracking).unwrap();

    // Still served from cache until refreshed.
    assert_eq!(cache.load().unwrap().tracking.len(), 3);
    assert_eq!(cache.refresh().unwrap().tracking.len(), 4);
}
