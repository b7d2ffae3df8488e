//! Menu-driven application flow tying the library, sites, and sessions
//! together.

use std::collections::HashMap;

use tracing::{info, warn};

use crate::config::{ConfigFile, ConfigStorage, StorageError};
use crate::site::RemoteSite;
use crate::ssh::RemoteSession;
use crate::ui::{
    self, input,
    menu::{
        self, AlbumAction, BlockAction, LocalDirAction, MainChoice, RemoteDirAction, SiteAction,
    },
    TerminalPrompt,
};

/// Owns the config and a per-site registry of live sessions, keyed by
/// site id. Sessions persist across menu visits and are torn down only
/// at shutdown.
pub struct MoverController {
    storage: ConfigStorage,
    config: ConfigFile,
    sessions: HashMap<String, RemoteSession>,
}

impl MoverController {
    /// Load the config and prime the album cache. A corrupt file is
    /// backed up and replaced by defaults inside the storage layer; a
    /// config written by a newer release is fatal.
    pub async fn new(storage: ConfigStorage) -> Result<Self, StorageError> {
        let mut config = storage.load().await?;
        config.library.refresh_album_cache();
        Ok(Self {
            storage,
            config,
            sessions: HashMap::new(),
        })
    }

    /// Main menu loop. Returns after the user exits and the config has
    /// been saved.
    pub async fn run(&mut self) {
        loop {
            match menu::main_menu() {
                MainChoice::Sites => {
                    if self.config.library.directories().is_empty() {
                        ui::err("Add a local directory before visiting sites.");
                        continue;
                    }
                    self.sites_menu().await;
                }
                MainChoice::LocalDirs => self.local_dirs_menu(),
                MainChoice::Exit => break,
            }
        }
        self.shutdown().await;
    }

    async fn sites_menu(&mut self) {
        loop {
            let names: Vec<String> = self.config.sites.iter().map(|s| s.name.clone()).collect();
            let (action, index) = menu::sites_menu(&names);
            match (action, index) {
                (SiteAction::New, _) => {
                    if let Some(data) = input::site_data() {
                        self.config.sites.push(RemoteSite::new(
                            data.name,
                            data.username,
                            data.hostname,
                            data.port,
                        ));
                    }
                }
                (SiteAction::Delete, Some(i)) => {
                    if input::confirm_delete() {
                        let site = self.config.sites.remove(i);
                        if let Some(mut session) = self.sessions.remove(&site.id) {
                            session.disconnect().await;
                        }
                        info!("Deleted site {}", site.name);
                    }
                }
                (SiteAction::Move, Some(i)) => self.move_music(i).await,
                (SiteAction::Dirs, Some(i)) => self.remote_dirs_menu(i),
                (SiteAction::Blocks, Some(i)) => self.blocked_albums_menu(i),
                (SiteAction::Quit, _) => return,
                (_, None) => ui::err("That action needs a site number."),
            }
        }
    }

    /// Connect (or reuse) the session for a site, list its albums, and
    /// loop over block/move actions. Albums already blocked or already
    /// in the local library are hidden; a failed move keeps the album
    /// on the list.
    async fn move_music(&mut self, site_index: usize) {
        let site = &self.config.sites[site_index];
        if site.directories().is_empty() {
            ui::err("Site has no remote directories. Add one first.");
            return;
        }
        let Some(save_dir) = self.config.library.save_dir().map(str::to_string) else {
            ui::err("No local save directory set.");
            return;
        };
        let site_id = site.id.clone();
        let site_name = site.name.clone();
        let roots = site.directories().to_vec();
        let endpoint = site.endpoint();

        let session = self
            .sessions
            .entry(site_id.clone())
            .or_insert_with(|| RemoteSession::new(endpoint));
        if let Err(e) = session.connect(&mut TerminalPrompt).await {
            ui::err(format!("Could not connect to {}: {}", site_name, e));
            // A dead session must not shadow the next attempt.
            self.sessions.remove(&site_id);
            return;
        }

        let (albums, stderr) = match session.list_albums(&roots).await {
            Ok(listing) => listing,
            Err(e) => {
                ui::err(format!("Could not list albums on {}: {}", site_name, e));
                return;
            }
        };
        for line in stderr {
            ui::err(line);
        }

        let site = &self.config.sites[site_index];
        let mut visible: Vec<String> = albums
            .keys()
            .filter(|album| !site.is_blocked(album))
            .filter(|album| !self.config.library.album_cache().contains(album))
            .cloned()
            .collect();
        visible.sort();

        loop {
            let (action, indexes) = menu::albums_menu(&site_name, &visible);
            let selected: Vec<String> = indexes.iter().map(|&i| visible[i].clone()).collect();
            match action {
                AlbumAction::Block => {
                    for album in &selected {
                        self.config.sites[site_index].block_album(album.clone());
                        info!("Blocked {} on {}", album, site_name);
                    }
                    visible.retain(|a| !selected.contains(a));
                }
                AlbumAction::Move => {
                    let mut moved = Vec::new();
                    for album in &selected {
                        let Some(source) = albums.get(album) else {
                            continue;
                        };
                        let session = match self.sessions.get_mut(&site_id) {
                            Some(session) => session,
                            None => return,
                        };
                        ui::note(format!("Moving {}...", album));
                        match session.pull_album(source, album, &save_dir).await {
                            Ok(failures) => {
                                for failure in &failures {
                                    ui::err(failure);
                                }
                                ui::note(format!("Moved {}.", album));
                                moved.push(album.clone());
                            }
                            Err(e) => {
                                warn!("Move of {} failed: {}", album, e);
                                ui::err(format!("Could not move {}: {}", album, e));
                            }
                        }
                    }
                    if !moved.is_empty() {
                        self.config.library.refresh_album_cache();
                        visible.retain(|a| !moved.contains(a));
                    }
                }
                AlbumAction::Quit => return,
            }
        }
    }

    fn local_dirs_menu(&mut self) {
        loop {
            let library = &self.config.library;
            let (action, index) =
                menu::local_dirs_menu(library.directories(), library.save_dir_index());
            match (action, index) {
                (LocalDirAction::Add, _) => {
                    if let Some(dir) = input::prompt_add_dir() {
                        self.config.library.add_dir(dir);
                    }
                }
                (LocalDirAction::Delete, Some(i)) => {
                    if input::confirm_delete() {
                        self.config.library.del_dir(i);
                    }
                }
                (LocalDirAction::SetActive, Some(i)) => self.config.library.set_save_dir(i),
                (LocalDirAction::Quit, _) => return,
                (_, None) => ui::err("That action needs a directory number."),
            }
        }
    }

    fn remote_dirs_menu(&mut self, site_index: usize) {
        loop {
            let site = &mut self.config.sites[site_index];
            let name = site.name.clone();
            let (action, index) = menu::remote_dirs_menu(&name, site.directories());
            match (action, index) {
                (RemoteDirAction::Add, _) => {
                    if let Some(dir) = input::prompt_add_remote_dir() {
                        site.add_dir(dir);
                    }
                }
                (RemoteDirAction::Delete, Some(i)) => {
                    if input::confirm_delete() {
                        site.del_dir(i);
                    }
                }
                (RemoteDirAction::Quit, _) => return,
                (_, None) => ui::err("That action needs a directory number."),
            }
        }
    }

    fn blocked_albums_menu(&mut self, site_index: usize) {
        loop {
            let site = &mut self.config.sites[site_index];
            let name = site.name.clone();
            let (action, index) = menu::blocked_albums_menu(&name, site.blocked_albums());
            match (action, index) {
                (BlockAction::Delete, Some(i)) => {
                    if input::confirm_delete() {
                        site.unblock_at(i);
                    }
                }
                (BlockAction::Quit, _) => return,
                (_, None) => ui::err("That action needs an entry number."),
            }
        }
    }

    /// Disconnect every live session and persist the config.
    async fn shutdown(&mut self) {
        for (_, mut session) in self.sessions.drain() {
            session.disconnect().await;
        }
        if let Err(e) = self.storage.save(&mut self.config).await {
            ui::err(format!("Could not save config: {}", e));
        }
        ui::note("Done.");
    }
}
