//! LAS/LAZ/COPC header reader.
//!
//! Only the public header block and the (extended) variable length records
//! are read through the `las` crate. LAZ and COPC keep these uncompressed,
//! so no point decoding is needed to catalog a file.

use std::path::Path;

use las::{Header, Reader, Vlr};

use super::{PointCloudReader, SourceMetadata};
use crate::error::{Result, Stac4dError};
use crate::models::NativeExtent;

const PROJECTION_USER_ID: &str = "LASF_Projection";
const WKT_RECORD_ID: u16 = 2112;
const GEOKEY_DIRECTORY_RECORD_ID: u16 = 34735;
const PROJECTED_CS_TYPE_GEOKEY: u16 = 3072;
const GEOGRAPHIC_TYPE_GEOKEY: u16 = 2048;
const USER_DEFINED_GEOKEY_VALUE: u16 = 32767;

/// Reader for LAS 1.0 - 1.4 headers, including LAZ and COPC files
#[derive(Debug, Clone, Copy, Default)]
pub struct LasHeaderReader;

impl PointCloudReader for LasHeaderReader {
    fn read(&self, path: &Path) -> Result<SourceMetadata> {
        let reader = Reader::from_path(path).map_err(|e| Stac4dError::SourceFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let metadata = metadata_from_header(reader.header());

        tracing::debug!(
            path = %path.display(),
            version = ?metadata.version,
            points = metadata.point_count,
            crs = ?metadata.crs,
            "Read LAS header"
        );

        Ok(metadata)
    }

    fn supported_extensions(&self) -> &[&str] {
        &["las", "laz"]
    }

    fn format_name(&self) -> &str {
        "LAS"
    }
}

fn metadata_from_header(header: &Header) -> SourceMetadata {
    let bounds = header.bounds();
    let version = header.version();
    let records = header.vlrs().iter().chain(header.evlrs());

    SourceMetadata {
        extent: NativeExtent::new([bounds.min.x, bounds.min.y], [bounds.max.x, bounds.max.y]),
        z_range: [bounds.min.z, bounds.max.z],
        version: Some(format!("{}.{}", version.major, version.minor)),
        crs: crs_from_records(records),
        point_count: header.number_of_points(),
    }
}

fn is_projection(vlr: &Vlr, record_id: u16) -> bool {
    vlr.record_id == record_id && vlr.user_id.trim_end_matches('\0') == PROJECTION_USER_ID
}

/// WKT wins over GeoTIFF keys; a projected code wins over a geographic one
fn crs_from_records<'a>(records: impl Iterator<Item = &'a Vlr> + Clone) -> Option<String> {
    let wkt = records.clone().find_map(|vlr| {
        if !is_projection(vlr, WKT_RECORD_ID) {
            return None;
        }
        let end = vlr.data.iter().position(|&b| b == 0).unwrap_or(vlr.data.len());
        let text = String::from_utf8_lossy(&vlr.data[..end]).trim().to_string();
        (!text.is_empty()).then_some(text)
    });
    if wkt.is_some() {
        return wkt;
    }

    records.filter(|vlr| is_projection(vlr, GEOKEY_DIRECTORY_RECORD_ID)).find_map(|vlr| {
        let keys: Vec<u16> =
            vlr.data.chunks_exact(2).map(|pair| u16::from_le_bytes([pair[0], pair[1]])).collect();
        epsg_from_geokeys(&keys).map(|code| format!("EPSG:{}", code))
    })
}

fn epsg_from_geokeys(keys: &[u16]) -> Option<u16> {
    let key_count = usize::from(*keys.get(3)?);
    let entries: Vec<&[u16]> = keys.get(4..)?.chunks_exact(4).take(key_count).collect();

    // Only inline values (tag location 0) carry a code directly
    let lookup = |wanted: u16| {
        entries
            .iter()
            .find(|entry| entry[0] == wanted && entry[1] == 0)
            .map(|entry| entry[3])
            .filter(|&code| code != 0 && code != USER_DEFINED_GEOKEY_VALUE)
    };

    lookup(PROJECTED_CS_TYPE_GEOKEY).or_else(|| lookup(GEOGRAPHIC_TYPE_GEOKEY))
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::{LittleEndian, WriteBytesExt};
    use std::io::Write;

    struct TestFile {
        minor: u8,
        min: [f64; 3],
        max: [f64; 3],
        points: u64,
        vlrs: Vec<(String, u16, Vec<u8>)>,
    }

    impl TestFile {
        fn new(minor: u8) -> Self {
            Self {
                minor,
                min: [674000.0, 5265000.0, 700.0],
                max: [674900.0, 5265600.0, 760.0],
                points: 1234,
                vlrs: Vec::new(),
            }
        }

        fn with_vlr(mut self, user_id: &str, record_id: u16, payload: Vec<u8>) -> Self {
            self.vlrs.push((user_id.to_string(), record_id, payload));
            self
        }

        /// Header and VLRs of an uncompressed point format 0 file; no point records follow
        fn bytes(&self) -> Vec<u8> {
            let header_size: u16 = if self.minor >= 4 { 375 } else { 227 };
            let vlr_bytes: usize = self.vlrs.iter().map(|(_, _, payload)| 54 + payload.len()).sum();
            let offset_to_points = header_size as u32 + vlr_bytes as u32;

            let mut buf = Vec::new();
            buf.write_all(b"LASF").unwrap();
            buf.resize(24, 0);
            buf.write_u8(1).unwrap();
            buf.write_u8(self.minor).unwrap();
            buf.resize(94, 0);
            buf.write_u16::<LittleEndian>(header_size).unwrap();
            buf.write_u32::<LittleEndian>(offset_to_points).unwrap();
            buf.write_u32::<LittleEndian>(self.vlrs.len() as u32).unwrap();
            buf.write_u8(0).unwrap();
            buf.write_u16::<LittleEndian>(20).unwrap();
            let legacy = if self.minor >= 4 { 0 } else { self.points as u32 };
            buf.write_u32::<LittleEndian>(legacy).unwrap();
            buf.resize(131, 0);
            for _ in 0..3 {
                buf.write_f64::<LittleEndian>(0.01).unwrap();
            }
            buf.resize(179, 0);
            for axis in 0..3 {
                buf.write_f64::<LittleEndian>(self.max[axis]).unwrap();
                buf.write_f64::<LittleEndian>(self.min[axis]).unwrap();
            }
            if self.minor >= 4 {
                buf.resize(235, 0);
                buf.write_u64::<LittleEndian>(0).unwrap();
                buf.write_u32::<LittleEndian>(0).unwrap();
                buf.write_u64::<LittleEndian>(self.points).unwrap();
            }
            buf.resize(header_size as usize, 0);

            for (user_id, record_id, payload) in &self.vlrs {
                buf.write_u16::<LittleEndian>(0).unwrap();
                let mut id = [0u8; 16];
                id[..user_id.len()].copy_from_slice(user_id.as_bytes());
                buf.write_all(&id).unwrap();
                buf.write_u16::<LittleEndian>(*record_id).unwrap();
                buf.write_u16::<LittleEndian>(payload.len() as u16).unwrap();
                buf.write_all(&[0u8; 32]).unwrap();
                buf.write_all(payload).unwrap();
            }
            buf
        }

        fn read(&self) -> Result<SourceMetadata> {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("Isar_20240812_ULS.las");
            std::fs::write(&path, self.bytes()).unwrap();
            LasHeaderReader.read(&path)
        }
    }

    fn geokeys(entries: &[[u16; 4]]) -> Vec<u8> {
        let mut keys = vec![1, 1, 0, entries.len() as u16];
        for entry in entries {
            keys.extend_from_slice(entry);
        }
        keys.iter().flat_map(|k| k.to_le_bytes()).collect()
    }

    #[test]
    fn test_reads_bounds_and_count_from_las12() {
        let metadata = TestFile::new(2).read().unwrap();

        assert_eq!(metadata.version.as_deref(), Some("1.2"));
        assert_eq!(metadata.extent, NativeExtent::new([674000.0, 5265000.0], [674900.0, 5265600.0]));
        assert_eq!(metadata.z_range, [700.0, 760.0]);
        assert_eq!(metadata.point_count, 1234);
        assert_eq!(metadata.crs, None);
    }

    #[test]
    fn test_las14_uses_extended_point_count() {
        let mut file = TestFile::new(4);
        file.points = 5_000_000_000;
        assert_eq!(file.read().unwrap().point_count, 5_000_000_000);
    }

    #[test]
    fn test_projected_geokey_wins() {
        let metadata = TestFile::new(2)
            .with_vlr("LASF_Spec", 4, vec![1, 2, 3])
            .with_vlr(
                PROJECTION_USER_ID,
                GEOKEY_DIRECTORY_RECORD_ID,
                geokeys(&[[1024, 0, 1, 1], [2048, 0, 1, 4258], [3072, 0, 1, 25832]]),
            )
            .read()
            .unwrap();
        assert_eq!(metadata.crs.as_deref(), Some("EPSG:25832"));
    }

    #[test]
    fn test_geographic_geokey_fallback() {
        let metadata = TestFile::new(2)
            .with_vlr(
                PROJECTION_USER_ID,
                GEOKEY_DIRECTORY_RECORD_ID,
                geokeys(&[[2048, 0, 1, 4326], [3072, 0, 1, USER_DEFINED_GEOKEY_VALUE]]),
            )
            .read()
            .unwrap();
        assert_eq!(metadata.crs.as_deref(), Some("EPSG:4326"));
    }

    #[test]
    fn test_wkt_record() {
        let mut wkt = br#"PROJCS["ETRS89 / UTM zone 32N",AUTHORITY["EPSG","25832"]]"#.to_vec();
        wkt.push(0);
        let metadata = TestFile::new(4)
            .with_vlr(PROJECTION_USER_ID, WKT_RECORD_ID, wkt)
            .read()
            .unwrap();
        assert_eq!(
            metadata.crs.as_deref(),
            Some(r#"PROJCS["ETRS89 / UTM zone 32N",AUTHORITY["EPSG","25832"]]"#)
        );
    }

    #[test]
    fn test_geokey_directory_parsing() {
        let keys = [1, 1, 0, 2, 1024, 0, 1, 1, 3072, 0, 1, 32632];
        assert_eq!(epsg_from_geokeys(&keys), Some(32632));
        // Value stored in another tag, not inline
        assert_eq!(epsg_from_geokeys(&[1, 1, 0, 1, 3072, 34736, 1, 0]), None);
        assert_eq!(epsg_from_geokeys(&[1, 1]), None);
    }

    #[test]
    fn test_rejects_non_las() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.las");
        std::fs::write(&path, b"PK\x03\x04 not a point cloud").unwrap();

        let err = LasHeaderReader.read(&path).unwrap_err();
        assert!(matches!(err, Stac4dError::SourceFile { .. }));
    }

    #[test]
    fn test_truncated_header_is_source_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken_20240812.laz");
        let mut bytes = TestFile::new(2).bytes();
        bytes.truncate(150);
        std::fs::write(&path, bytes).unwrap();

        let err = LasHeaderReader.read(&path).unwrap_err();
        assert!(matches!(err, Stac4dError::SourceFile { .. }));
    }
}
