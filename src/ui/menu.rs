//! Menu rendering and the closed action sets for each screen.

use super::color::{paint, Color};
use super::input::{self, MenuAction};

const BORDER_WIDTH: usize = 79;
const SPLIT_THRESHOLD: usize = 50;
const COLUMN_WIDTH: usize = 49;

/// Top-level menu choice.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MainChoice {
    Sites,
    LocalDirs,
    Exit,
}

/// Actions on the site list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SiteAction {
    New,
    Move,
    Delete,
    Dirs,
    Blocks,
    Quit,
}

impl MenuAction for SiteAction {
    fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'n' => Some(Self::New),
            'm' => Some(Self::Move),
            'd' => Some(Self::Delete),
            'r' => Some(Self::Dirs),
            'b' => Some(Self::Blocks),
            'q' => Some(Self::Quit),
            _ => None,
        }
    }

    fn letters() -> &'static str {
        "n, m, d, r, b, q"
    }

    fn quit() -> Self {
        Self::Quit
    }
}

/// Actions on the local directory list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LocalDirAction {
    Add,
    Delete,
    SetActive,
    Quit,
}

impl MenuAction for LocalDirAction {
    fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'a' => Some(Self::Add),
            'd' => Some(Self::Delete),
            's' => Some(Self::SetActive),
            'q' => Some(Self::Quit),
            _ => None,
        }
    }

    fn letters() -> &'static str {
        "a, d, s, q"
    }

    fn quit() -> Self {
        Self::Quit
    }
}

/// Actions on a site's remote directory list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RemoteDirAction {
    Add,
    Delete,
    Quit,
}

impl MenuAction for RemoteDirAction {
    fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'a' => Some(Self::Add),
            'd' => Some(Self::Delete),
            'q' => Some(Self::Quit),
            _ => None,
        }
    }

    fn letters() -> &'static str {
        "a, d, q"
    }

    fn quit() -> Self {
        Self::Quit
    }
}

/// Actions on a site's block list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockAction {
    Delete,
    Quit,
}

impl MenuAction for BlockAction {
    fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'd' => Some(Self::Delete),
            'q' => Some(Self::Quit),
            _ => None,
        }
    }

    fn letters() -> &'static str {
        "d, q"
    }

    fn quit() -> Self {
        Self::Quit
    }
}

/// Actions on the remote album list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlbumAction {
    Block,
    Move,
    Quit,
}

impl MenuAction for AlbumAction {
    fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'b' => Some(Self::Block),
            'm' => Some(Self::Move),
            'q' => Some(Self::Quit),
            _ => None,
        }
    }

    fn letters() -> &'static str {
        "b, m, q"
    }

    fn quit() -> Self {
        Self::Quit
    }
}

/// Render a titled, numbered menu. Long lists render in two columns
/// with entries shortened to fit.
pub fn display_menu(title: &str, entries: &[String], footer: &str) {
    println!("{}", paint(Color::Yellow, &".".repeat(BORDER_WIDTH)));
    println!("{}", paint(Color::Yellow, &format!(". {}", title)));
    println!("{}", paint(Color::Yellow, &".".repeat(BORDER_WIDTH)));

    if entries.len() > SPLIT_THRESHOLD {
        let half = entries.len().div_ceil(2);
        for row in 0..half {
            let left = column_cell(row, &entries[row]);
            match entries.get(half + row) {
                Some(right) => println!("{} {}", left, column_cell(half + row, right)),
                None => println!("{}", left),
            }
        }
    } else {
        for (i, entry) in entries.iter().enumerate() {
            println!("{:3}. {}", i + 1, entry);
        }
    }

    if !footer.is_empty() {
        println!("{}", paint(Color::Yellow, &format!(". {}", footer)));
    }
    println!("{}", paint(Color::Yellow, &".".repeat(BORDER_WIDTH)));
}

fn column_cell(index: usize, entry: &str) -> String {
    let short: String = entry.chars().take(COLUMN_WIDTH).collect();
    format!("{:3}. {:<width$}", index + 1, short, width = COLUMN_WIDTH)
}

/// Top-level menu. EOF maps to Exit.
pub fn main_menu() -> MainChoice {
    let entries = vec![
        "Sites".to_string(),
        "Local Directories".to_string(),
        "Exit".to_string(),
    ];
    display_menu("Music Mover", &entries, "");
    match input::menu_input(entries.len()) {
        Some(0) => MainChoice::Sites,
        Some(1) => MainChoice::LocalDirs,
        _ => MainChoice::Exit,
    }
}

/// Site list menu. Returns the chosen action and an optional site index.
pub fn sites_menu(names: &[String]) -> (SiteAction, Option<usize>) {
    let entries = if names.is_empty() {
        vec!["No sites.".to_string()]
    } else {
        names.to_vec()
    };
    display_menu(
        "Sites",
        &entries,
        "n: new site, m: move music, d: delete site, r: remote dirs, b: blocked albums, q: quit",
    );
    input::action_input::<SiteAction>(names.len())
}

/// Local directory menu. The active save directory is starred.
pub fn local_dirs_menu(dirs: &[String], active: usize) -> (LocalDirAction, Option<usize>) {
    let entries = if dirs.is_empty() {
        vec!["No directories.".to_string()]
    } else {
        dirs.iter()
            .enumerate()
            .map(|(i, dir)| {
                if i == active {
                    format!("{} *", dir)
                } else {
                    dir.clone()
                }
            })
            .collect()
    };
    display_menu(
        "Local Directories",
        &entries,
        "a: add dir, d: delete dir, s: set save dir, q: quit",
    );
    input::action_input::<LocalDirAction>(dirs.len())
}

/// Remote directory menu for a site.
pub fn remote_dirs_menu(site_name: &str, dirs: &[String]) -> (RemoteDirAction, Option<usize>) {
    let entries = if dirs.is_empty() {
        vec!["No directories.".to_string()]
    } else {
        dirs.to_vec()
    };
    display_menu(
        &format!("Remote Directories: {}", site_name),
        &entries,
        "a: add dir, d: delete dir, q: quit",
    );
    input::action_input::<RemoteDirAction>(dirs.len())
}

/// Block list menu for a site.
pub fn blocked_albums_menu(site_name: &str, albums: &[String]) -> (BlockAction, Option<usize>) {
    let entries = if albums.is_empty() {
        vec!["No blocked albums.".to_string()]
    } else {
        albums.to_vec()
    };
    display_menu(
        &format!("Blocked Albums: {}", site_name),
        &entries,
        "d: delete entry, q: quit",
    );
    input::action_input::<BlockAction>(albums.len())
}

/// Remote album menu. Selections may be lists with ranges (`1,3-5`).
pub fn albums_menu(site_name: &str, albums: &[String]) -> (AlbumAction, Vec<usize>) {
    let entries = if albums.is_empty() {
        vec!["No new albums.".to_string()]
    } else {
        albums.to_vec()
    };
    display_menu(
        &format!("New Albums: {}", site_name),
        &entries,
        "b: block album, m: move album, q: quit",
    );
    input::action_list_input::<AlbumAction>(albums.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_letters_round_trip() {
        assert_eq!(SiteAction::from_letter('m'), Some(SiteAction::Move));
        assert_eq!(SiteAction::from_letter('x'), None);
        assert_eq!(AlbumAction::from_letter('b'), Some(AlbumAction::Block));
        assert_eq!(LocalDirAction::from_letter('s'), Some(LocalDirAction::SetActive));
        assert_eq!(BlockAction::from_letter('q'), Some(BlockAction::Quit));
        assert_eq!(RemoteDirAction::from_letter('a'), Some(RemoteDirAction::Add));
    }

    #[test]
    fn column_cell_truncates_long_entries() {
        let long = "x".repeat(80);
        let cell = column_cell(0, &long);
        assert!(cell.starts_with("  1. "));
        assert_eq!(cell.len(), 5 + COLUMN_WIDTH);
    }
}
