use std::collections::HashSet;
use std::net::IpAddr;
use std::path::Path;

/// Set of banned peer addresses, checked on every accepted connection.
#[derive(Debug, Default, Clone)]
pub struct BanList {
    addrs: HashSet<IpAddr>,
}

impl BanList {
    /// A ban list with no entries.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load a ban list from a text file: one address per line, blank lines
    /// and `#` comments ignored. Unparseable lines are logged and skipped.
    pub fn load(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let mut addrs = HashSet::new();
        for raw in content.lines() {
            let entry = raw.trim();
            if entry.is_empty() || entry.starts_with('#') {
                continue;
            }
            match entry.parse::<IpAddr>() {
                Ok(addr) => {
                    addrs.insert(addr);
                }
                Err(_) => {
                    tracing::warn!(entry, path = %path.display(), "skipping unparseable ban entry");
                }
            }
        }
        tracing::info!(count = addrs.len(), path = %path.display(), "ban list loaded");
        Ok(Self { addrs })
    }

    pub fn is_banned(&self, addr: &IpAddr) -> bool {
        self.addrs.contains(addr)
    }

    pub fn len(&self) -> usize {
        self.addrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addrs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_list_bans_nobody() {
        let bans = BanList::empty();
        assert!(!bans.is_banned(&"127.0.0.1".parse().unwrap()));
    }

    #[test]
    fn load_skips_comments_and_garbage() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(
            f,
            "# troublemakers\n10.0.0.5\n\nnot-an-address\n2001:db8::1\n"
        )
        .unwrap();

        let bans = BanList::load(f.path()).unwrap();
        assert_eq!(bans.len(), 2);
        assert!(bans.is_banned(&"10.0.0.5".parse().unwrap()));
        assert!(bans.is_banned(&"2001:db8::1".parse().unwrap()));
        assert!(!bans.is_banned(&"10.0.0.6".parse().unwrap()));
    }
}
