use std::collections::HashMap;
use std::ffi::OsStr;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use flate2::read::MultiGzDecoder;

use varcollect_core::{InfoMap, InfoValue};

use crate::error::{Result, VcfError};

/// One parsed data line of a VCF.
///
/// ALT entries are kept verbatim, including "." no-call markers, so that
/// allele indices always reflect positions in the original ALT list.
#[derive(Debug, Clone, PartialEq)]
pub struct VcfRecord {
    pub chrom: String,
    /// 1-based position.
    pub pos: u64,
    /// Record identifier; `None` when the column was ".".
    pub id: Option<String>,
    pub reference: String,
    pub alt: Vec<String>,
    pub qual: Option<f64>,
    /// `None` = unfiltered ("."), empty = PASS, otherwise failing filters.
    pub filter: Option<Vec<String>>,
    pub info: InfoMap,
}

///
/// Minimal streaming VCF reader: header metadata plus a record iterator.
///
/// The header is consumed eagerly on construction, the way downstream code
/// needs it (reference inference reads `metadata` before any record is
/// pulled). Simple `##key=value` pairs land in the metadata map; structured
/// `##INFO=<...>`-style definitions and the `#CHROM` column line are
/// skipped. Multi-sample columns past INFO are ignored.
///
pub struct VcfReader {
    lines: Box<dyn Iterator<Item = Result<String>>>,
    /// Simple header metadata, e.g. `##reference=/path/to/hg19.fa`.
    pub metadata: HashMap<String, String>,
    pending: Option<String>,
    line_no: usize,
}

impl VcfReader {
    ///
    /// Build a reader over any line source (used for decompressed network
    /// streams).
    ///
    pub fn from_lines<I>(lines: I) -> Result<Self>
    where
        I: Iterator<Item = Result<String>> + 'static,
    {
        let mut reader = VcfReader {
            lines: Box::new(lines),
            metadata: HashMap::new(),
            pending: None,
            line_no: 0,
        };
        reader.read_header()?;
        Ok(reader)
    }

    pub fn from_reader<R>(reader: R) -> Result<Self>
    where
        R: BufRead + 'static,
    {
        Self::from_lines(reader.lines().map(|line| line.map_err(VcfError::from)))
    }

    ///
    /// Open a local VCF, transparently decompressing `.gz` files.
    ///
    /// # Arguments
    /// - path: path to the file to read
    pub fn from_path(path: &Path) -> Result<Self> {
        Self::from_reader(open_buffered(path)?)
    }

    fn next_line(&mut self) -> Option<Result<String>> {
        let line = self.lines.next();
        if line.is_some() {
            self.line_no += 1;
        }
        line
    }

    fn read_header(&mut self) -> Result<()> {
        while let Some(line) = self.next_line() {
            let line = line?;
            if let Some(meta) = line.strip_prefix("##") {
                if let Some((key, value)) = meta.split_once('=') {
                    // Structured definitions (##INFO=<...>) are not metadata.
                    if !value.starts_with('<') {
                        self.metadata.insert(key.to_string(), value.to_string());
                    }
                }
            } else if line.starts_with('#') {
                // Column header line; data starts next.
            } else {
                self.pending = Some(line);
                break;
            }
        }
        Ok(())
    }

    fn parse_record(&self, line: &str) -> Result<VcfRecord> {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 7 {
            return Err(VcfError::MalformedRecord {
                line: self.line_no,
                msg: format!("expected at least 7 columns, found {}", fields.len()),
            });
        }

        let pos = fields[1]
            .parse::<u64>()
            .map_err(|_| VcfError::MalformedRecord {
                line: self.line_no,
                msg: format!("invalid POS: {:?}", fields[1]),
            })?;
        let qual = match fields[5] {
            "." => None,
            raw => Some(raw.parse::<f64>().map_err(|_| VcfError::MalformedRecord {
                line: self.line_no,
                msg: format!("invalid QUAL: {:?}", raw),
            })?),
        };

        Ok(VcfRecord {
            chrom: fields[0].to_string(),
            pos,
            id: parse_id(fields[2]),
            reference: fields[3].to_string(),
            alt: fields[4].split(',').map(str::to_string).collect(),
            qual,
            filter: parse_filter(fields[6]),
            info: fields.get(7).map(|raw| parse_info(raw)).unwrap_or_default(),
        })
    }
}

impl Iterator for VcfReader {
    type Item = Result<VcfRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.pending.take() {
                Some(line) => line,
                None => match self.next_line()? {
                    Ok(line) => line,
                    Err(e) => return Some(Err(e)),
                },
            };
            if line.is_empty() {
                continue;
            }
            return Some(self.parse_record(&line));
        }
    }
}

///
/// Get a buffered reader for either a gzip'd or non-gzip'd file.
///
/// # Arguments
/// - path: path to the file to read
///
pub(crate) fn open_buffered(path: &Path) -> Result<BufReader<Box<dyn Read>>> {
    let is_gzipped = path.extension() == Some(OsStr::new("gz"));
    let file = File::open(path).map_err(|source| VcfError::Open {
        path: path.display().to_string(),
        source,
    })?;
    let file: Box<dyn Read> = match is_gzipped {
        true => Box::new(MultiGzDecoder::new(file)),
        false => Box::new(file),
    };
    Ok(BufReader::new(file))
}

/// ID column: "." means no identifier.
pub fn parse_id(raw: &str) -> Option<String> {
    match raw {
        "." => None,
        other => Some(other.to_string()),
    }
}

/// FILTER column: "." → None, "PASS" → empty list, otherwise the
/// ";"-separated failing filter names in order.
pub fn parse_filter(raw: &str) -> Option<Vec<String>> {
    match raw {
        "." => None,
        "PASS" => Some(vec![]),
        other => Some(other.split(';').map(str::to_string).collect()),
    }
}

///
/// Parse an INFO column string into a typed key/value map.
///
/// Entries are ";"-separated; bare keys become flags, "," splits values into
/// lists, and scalars are narrowed to integer or float where they parse.
///
pub fn parse_info(raw: &str) -> InfoMap {
    let mut info = InfoMap::new();
    if raw == "." {
        return info;
    }
    for entry in raw.split(';') {
        if entry.is_empty() {
            continue;
        }
        match entry.split_once('=') {
            None => {
                info.insert(entry.to_string(), InfoValue::Flag);
            }
            Some((key, value)) => {
                let parsed = if value.contains(',') {
                    InfoValue::List(value.split(',').map(parse_info_scalar).collect())
                } else {
                    parse_info_scalar(value)
                };
                info.insert(key.to_string(), parsed);
            }
        }
    }
    info
}

fn parse_info_scalar(raw: &str) -> InfoValue {
    if let Ok(integer) = raw.parse::<i64>() {
        return InfoValue::Integer(integer);
    }
    if let Ok(float) = raw.parse::<f64>() {
        return InfoValue::Float(float);
    }
    InfoValue::String(raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Cursor;

    use pretty_assertions::assert_eq;
    use rstest::*;

    const SAMPLE: &str = "\
##fileformat=VCFv4.2\n\
##reference=/data/Homo_sapiens.GRCh37.75.fa\n\
##INFO=<ID=DP,Number=1,Type=Integer,Description=\"Total Depth\">\n\
#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\n\
1\t100\t.\tA\tT\t.\tPASS\tDP=14;AF=0.5\n\
1\t200\trs1\tG\tC,T\t30\tq10;s50\tDB\n";

    fn sample_reader() -> VcfReader {
        VcfReader::from_reader(Cursor::new(SAMPLE.to_string())).unwrap()
    }

    #[rstest]
    fn test_header_metadata() {
        let reader = sample_reader();
        assert_eq!(reader.metadata["fileformat"], "VCFv4.2");
        assert_eq!(
            reader.metadata["reference"],
            "/data/Homo_sapiens.GRCh37.75.fa"
        );
        // Structured definitions are not simple metadata.
        assert!(!reader.metadata.contains_key("INFO"));
    }

    #[rstest]
    fn test_record_fields() {
        let records: Vec<VcfRecord> = sample_reader().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 2);

        let first = &records[0];
        assert_eq!(first.chrom, "1");
        assert_eq!(first.pos, 100);
        assert_eq!(first.id, None);
        assert_eq!(first.qual, None);
        assert_eq!(first.filter, Some(vec![]));
        assert_eq!(first.info["DP"], InfoValue::Integer(14));
        assert_eq!(first.info["AF"], InfoValue::Float(0.5));

        let second = &records[1];
        assert_eq!(second.id.as_deref(), Some("rs1"));
        assert_eq!(second.alt, vec!["C", "T"]);
        assert_eq!(second.qual, Some(30.0));
        assert_eq!(
            second.filter,
            Some(vec!["q10".to_string(), "s50".to_string()])
        );
        assert_eq!(second.info["DB"], InfoValue::Flag);
    }

    #[rstest]
    fn test_malformed_record() {
        let reader = VcfReader::from_reader(Cursor::new("1\tnot_a_pos\t.\tA\tT\t.\tPASS\n"));
        let result = reader.unwrap().next().unwrap();
        assert!(matches!(
            result,
            Err(VcfError::MalformedRecord { line: 1, .. })
        ));
    }

    #[rstest]
    #[case(".", None)]
    #[case("PASS", Some(vec![]))]
    #[case("q10;s50", Some(vec!["q10".to_string(), "s50".to_string()]))]
    fn test_parse_filter(#[case] raw: &str, #[case] expected: Option<Vec<String>>) {
        assert_eq!(parse_filter(raw), expected);
    }

    #[rstest]
    fn test_parse_info_lists_and_missing() {
        let info = parse_info("AC=3,1;SOMATIC;GENE=TP53");
        assert_eq!(
            info["AC"],
            InfoValue::List(vec![InfoValue::Integer(3), InfoValue::Integer(1)])
        );
        assert_eq!(info["SOMATIC"], InfoValue::Flag);
        assert_eq!(info["GENE"], InfoValue::String("TP53".to_string()));

        assert!(parse_info(".").is_empty());
    }
}
