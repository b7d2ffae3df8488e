//! Cross-module flows: persisted config driving the library and the
//! remote listing parser.

use std::fs;

use mediamover::config::{ConfigFile, ConfigStorage};
use mediamover::site::RemoteSite;
use mediamover::transfer::listing;

#[tokio::test]
async fn config_survives_a_full_save_load_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let storage = ConfigStorage::with_path(dir.path().join("config.json"));

    let mut config = ConfigFile::default();
    config.library.add_dir("/home/dan/music".to_string());
    config.library.add_dir("/mnt/archive".to_string());
    config.library.set_save_dir(1);

    let mut site = RemoteSite::new(
        "attic".to_string(),
        "dan".to_string(),
        "music.example.com".to_string(),
        2222,
    );
    site.add_dir("/srv/music".to_string());
    site.block_album("Bootlegs".to_string());
    let site_id = site.id.clone();
    config.sites.push(site);

    storage.save(&mut config).await.unwrap();
    let reloaded = storage.load().await.unwrap();

    assert_eq!(
        reloaded.library.directories(),
        ["/home/dan/music", "/mnt/archive"]
    );
    assert_eq!(reloaded.library.save_dir(), Some("/mnt/archive"));
    assert_eq!(reloaded.sites.len(), 1);
    assert_eq!(reloaded.sites[0].id, site_id);
    assert_eq!(reloaded.sites[0].port, 2222);
    assert_eq!(reloaded.sites[0].directories(), ["/srv/music"]);
    assert!(reloaded.sites[0].is_blocked("Bootlegs"));
}

#[tokio::test]
async fn legacy_config_without_version_or_site_ids_loads() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(
        &path,
        r#"{
            "library": { "directories": ["/music"] },
            "sites": [{
                "name": "attic",
                "username": "dan",
                "hostname": "music.example.com",
                "port": 22
            }]
        }"#,
    )
    .unwrap();

    let config = ConfigStorage::with_path(path).load().await.unwrap();
    assert_eq!(config.library.directories(), ["/music"]);
    assert!(!config.sites[0].id.is_empty());
}

/// A remote listing filtered against the local album cache leaves only
/// albums that are genuinely new.
#[test]
fn remote_listing_filtered_against_local_albums() {
    let local = tempfile::tempdir().unwrap();
    fs::create_dir(local.path().join("Old Album")).unwrap();

    let mut config = ConfigFile::default();
    config
        .library
        .add_dir(local.path().to_string_lossy().to_string());

    let roots = vec!["/srv/music".to_string()];
    let output = ["Old Album", "New Album"];
    let albums = listing::parse(output, &roots);
    assert_eq!(albums.len(), 2);

    let fresh: Vec<&String> = albums
        .keys()
        .filter(|album| !config.library.album_cache().contains(album))
        .collect();
    assert_eq!(fresh, [&"New Album".to_string()]);
}
