//! Loose objects: one zlib-compressed `"<type> <size>\0<content>"` file per
//! object at `objects/XX/YYYY...`.

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use sprig_hash::{Hasher, ObjectId};
use sprig_object::{header, Object};
use tracing::trace;

use crate::{ObjectStore, OdbError};

pub struct LooseStore {
    objects_dir: PathBuf,
    compression: flate2::Compression,
}

impl LooseStore {
    pub fn open(objects_dir: impl AsRef<Path>) -> Self {
        Self {
            objects_dir: objects_dir.as_ref().to_path_buf(),
            compression: flate2::Compression::default(),
        }
    }

    pub fn objects_dir(&self) -> &Path {
        &self.objects_dir
    }

    pub fn object_path(&self, oid: &ObjectId) -> PathBuf {
        self.objects_dir.join(oid.loose_path())
    }

    fn read_raw(&self, oid: &ObjectId) -> Result<Option<Vec<u8>>, OdbError> {
        let compressed = match fs::read(self.object_path(oid)) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let mut raw = Vec::with_capacity(compressed.len() * 2);
        ZlibDecoder::new(&compressed[..])
            .read_to_end(&mut raw)
            .map_err(|e| OdbError::Corrupt {
                oid: *oid,
                reason: format!("zlib: {e}"),
            })?;
        Ok(Some(raw))
    }

    fn persist(&self, oid: &ObjectId, raw: &[u8]) -> Result<(), OdbError> {
        let final_path = self.object_path(oid);
        let fanout = final_path
            .parent()
            .ok_or_else(|| io::Error::other("object path has no parent"))?;
        fs::create_dir_all(fanout)?;

        let tmp = tempfile::Builder::new()
            .prefix("tmp_obj_")
            .tempfile_in(fanout)?;
        let mut encoder = ZlibEncoder::new(tmp, self.compression);
        encoder.write_all(raw)?;
        let tmp = encoder.finish()?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(tmp.path(), fs::Permissions::from_mode(0o444))?;
        }

        match tmp.persist(&final_path) {
            Ok(_) => Ok(()),
            // Another writer won the race with identical content.
            Err(_) if final_path.is_file() => Ok(()),
            Err(e) => Err(e.error.into()),
        }
    }
}

impl ObjectStore for LooseStore {
    fn read(&self, oid: &ObjectId) -> Result<Option<Object>, OdbError> {
        let Some(raw) = self.read_raw(oid)? else {
            return Ok(None);
        };
        let actual = Hasher::digest(&raw)?;
        if actual != *oid {
            return Err(OdbError::Corrupt {
                oid: *oid,
                reason: format!("content hashes to {actual}"),
            });
        }
        Ok(Some(Object::parse(&raw)?))
    }

    fn contains(&self, oid: &ObjectId) -> bool {
        self.object_path(oid).is_file()
    }

    fn write(&self, obj: &Object) -> Result<ObjectId, OdbError> {
        let content = obj.serialize_content();
        let mut raw = header::write_header(obj.object_type(), content.len());
        raw.extend_from_slice(&content);
        let oid = Hasher::digest(&raw)?;

        if self.contains(&oid) {
            return Ok(oid);
        }
        self.persist(&oid, &raw)?;
        trace!(%oid, kind = %obj.object_type(), "wrote loose object");
        Ok(oid)
    }

    fn lookup_prefix(&self, prefix: &str) -> Result<Vec<ObjectId>, OdbError> {
        if !prefix.bytes().all(|c| c.is_ascii_hexdigit()) {
            return Ok(Vec::new());
        }
        let prefix = prefix.to_ascii_lowercase();
        let dirs: Vec<PathBuf> = if prefix.len() >= 2 {
            vec![self.objects_dir.join(&prefix[..2])]
        } else {
            (0..=0xffu8)
                .map(|b| self.objects_dir.join(format!("{b:02x}")))
                .filter(|d| d.is_dir())
                .collect()
        };

        let mut found = Vec::new();
        for dir in dirs {
            let Some(dir_name) = dir.file_name().and_then(|n| n.to_str()).map(str::to_owned) else {
                continue;
            };
            let entries = match fs::read_dir(&dir) {
                Ok(entries) => entries,
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };
            for entry in entries {
                let entry = entry?;
                let Some(rest) = entry.file_name().to_str().map(str::to_owned) else {
                    continue;
                };
                if rest.len() != 38 {
                    continue;
                }
                if let Ok(oid) = ObjectId::from_hex(&format!("{dir_name}{rest}")) {
                    if oid.starts_with_hex(&prefix) {
                        found.push(oid);
                    }
                }
            }
        }
        Ok(found)
    }
}
