use std::collections::HashMap;
use std::io::{BufRead, BufReader, Cursor, Lines, Read};
use std::path::Path;
use std::sync::Arc;

use polars::prelude::*;

use varcollect_core::{Genome, InfoMap, Variant, VariantCollection, VariantMetadata};

use crate::error::{Result, VcfError};
use crate::load::{LoadOptions, load_vcf, resolve_genome};
use crate::reader::{open_buffered, parse_info};
use crate::source::{VcfHandle, file_url_path, split_scheme};

/// Fixed leading VCF columns, in the order every chunk must present them.
const FIXED_COLUMNS: [&str; 7] = ["CHROM", "POS", "ID", "REF", "ALT", "QUAL", "FILTER"];

fn expected_columns(include_info: bool) -> Vec<String> {
    let mut columns: Vec<String> = FIXED_COLUMNS.iter().map(|c| c.to_string()).collect();
    if include_info {
        columns.push("INFO".to_string());
    }
    columns
}

fn vcf_schema(include_info: bool) -> SchemaRef {
    let mut fields = vec![
        Field::new("CHROM".into(), DataType::String),
        Field::new("POS".into(), DataType::Int64),
        Field::new("ID".into(), DataType::String),
        Field::new("REF".into(), DataType::String),
        Field::new("ALT".into(), DataType::String),
        Field::new("QUAL".into(), DataType::String),
        Field::new("FILTER".into(), DataType::String),
    ];
    if include_info {
        fields.push(Field::new("INFO".into(), DataType::String));
    }
    Arc::new(Schema::from_iter(fields))
}

///
/// Lazy sequence of fixed-column dataframe chunks read from a VCF.
///
/// Header and comment lines are skipped, data lines are truncated to the
/// fixed leading columns (FORMAT and sample columns are ignored), and each
/// batch of `chunk_size` rows is parsed into a [`DataFrame`] with an
/// explicit schema so cells stay untyped strings (QUAL "." survives).
///
pub struct DataFrameChunks {
    lines: Lines<BufReader<Box<dyn Read>>>,
    schema: SchemaRef,
    ncols: usize,
    chunk_size: usize,
    done: bool,
}

impl DataFrameChunks {
    fn parse_chunk(&self, text: String) -> Result<DataFrame> {
        let df = CsvReadOptions::default()
            .with_has_header(false)
            .with_schema(Some(Arc::clone(&self.schema)))
            .map_parse_options(|parse_options| {
                parse_options.with_separator(b'\t').with_quote_char(None)
            })
            .into_reader_with_file_handle(Cursor::new(text))
            .finish()?;
        Ok(df)
    }
}

/// First `ncols` tab-separated fields of a line.
fn leading_fields(line: &str, ncols: usize) -> &str {
    match line.match_indices('\t').nth(ncols - 1) {
        Some((idx, _)) => &line[..idx],
        None => line,
    }
}

impl Iterator for DataFrameChunks {
    type Item = Result<DataFrame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let mut buffer = String::new();
        let mut rows = 0;
        while rows < self.chunk_size {
            let line = match self.lines.next() {
                Some(Ok(line)) => line,
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(e.into()));
                }
                None => {
                    self.done = true;
                    break;
                }
            };
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            buffer.push_str(leading_fields(&line, self.ncols));
            buffer.push('\n');
            rows += 1;
        }
        if rows == 0 {
            return None;
        }
        Some(self.parse_chunk(buffer))
    }
}

///
/// Read the data lines of a local VCF into dataframe chunks.
///
/// # Arguments
/// - path: local `.vcf` or `.vcf.gz` file
/// - include_info: keep the INFO column as a raw string column
/// - chunk_size: rows per chunk
///
pub fn read_vcf_into_dataframes(
    path: &Path,
    include_info: bool,
    chunk_size: usize,
) -> Result<DataFrameChunks> {
    let ncols = FIXED_COLUMNS.len() + usize::from(include_info);
    Ok(DataFrameChunks {
        lines: open_buffered(path)?.lines(),
        schema: vcf_schema(include_info),
        ncols,
        chunk_size,
        done: false,
    })
}

///
/// Normalize an iterable of fixed-column dataframe chunks into a
/// [`VariantCollection`].
///
/// Chunk columns must be exactly CHROM/POS/ID/REF/ALT/QUAL/FILTER, plus
/// INFO when an `info_parser` is supplied; anything else is an integration
/// error, not a data error. Cells are normalized at the string level
/// (FILTER "."/"PASS"/";"-list, ID ".", QUAL "."), ALT lists are split on
/// ",", and "." alleles are dropped without disturbing the positional
/// indices of their siblings. The running variant count persists across
/// chunk boundaries and never exceeds `max_variants`.
///
pub fn dataframes_to_variant_collection<I>(
    dataframes: I,
    info_parser: Option<fn(&str) -> InfoMap>,
    only_passing: bool,
    max_variants: Option<usize>,
    genome: Arc<Genome>,
    allow_extended_nucleotides: bool,
    path: Option<&str>,
) -> Result<VariantCollection>
where
    I: IntoIterator<Item = Result<DataFrame>>,
{
    let expected = expected_columns(info_parser.is_some());
    let mut variants: Vec<Variant> = Vec::new();
    let mut metadata: HashMap<Variant, VariantMetadata> = HashMap::new();
    let mut row_no = 0usize;

    'chunks: for chunk in dataframes {
        let mut chunk = chunk?;
        if info_parser.is_none() && chunk.get_column_names_str().contains(&"INFO") {
            chunk = chunk.drop("INFO")?;
        }
        let found: Vec<String> = chunk
            .get_column_names_str()
            .iter()
            .map(|name| name.to_string())
            .collect();
        if found != expected {
            return Err(VcfError::TableShape { expected, found });
        }

        let chrom_col = chunk.column("CHROM")?.str()?;
        let pos_col = chunk.column("POS")?.i64()?;
        let id_col = chunk.column("ID")?.str()?;
        let ref_col = chunk.column("REF")?.str()?;
        let alt_col = chunk.column("ALT")?.str()?;
        let qual_col = chunk.column("QUAL")?.str()?;
        let filter_col = chunk.column("FILTER")?.str()?;
        let info_col = match info_parser {
            Some(_) => Some(chunk.column("INFO")?.str()?),
            None => None,
        };

        for row in 0..chunk.height() {
            row_no += 1;
            let filter = match filter_col.get(row).unwrap_or(".") {
                "." => None,
                "PASS" => Some(vec![]),
                failing => {
                    if only_passing {
                        continue;
                    }
                    Some(failing.split(';').map(str::to_string).collect())
                }
            };
            let id = match id_col.get(row) {
                None | Some(".") => None,
                Some(value) => Some(value.to_string()),
            };
            let qual = match qual_col.get(row) {
                None | Some(".") => None,
                Some(raw) => Some(raw.parse::<f64>().map_err(|_| VcfError::MalformedRow {
                    row: row_no,
                    msg: format!("invalid QUAL: {:?}", raw),
                })?),
            };
            let pos = pos_col.get(row).ok_or_else(|| VcfError::MalformedRow {
                row: row_no,
                msg: "missing POS".to_string(),
            })?;
            // The table schema is Int64; a negative cell must fail the same
            // way the streaming parser fails it, not wrap.
            let pos = u64::try_from(pos).map_err(|_| VcfError::MalformedRow {
                row: row_no,
                msg: format!("invalid POS: {}", pos),
            })?;
            // Parsed once per row; the same map is shared by every allele.
            let info = match (info_parser, &info_col) {
                (Some(parse), Some(column)) => Some(parse(column.get(row).unwrap_or("."))),
                _ => None,
            };

            let chrom = chrom_col.get(row).unwrap_or("");
            let reference = ref_col.get(row).unwrap_or("");
            for (alt_allele_index, allele) in
                alt_col.get(row).unwrap_or(".").split(',').enumerate()
            {
                if allele == "." {
                    continue;
                }
                if let Some(max) = max_variants {
                    if variants.len() >= max {
                        break 'chunks;
                    }
                }
                let variant = Variant::new(
                    chrom,
                    pos,
                    reference,
                    allele,
                    Arc::clone(&genome),
                    allow_extended_nucleotides,
                )?;
                metadata.insert(
                    variant.clone(),
                    VariantMetadata {
                        id: id.clone(),
                        qual,
                        filter: filter.clone(),
                        alt_allele_index,
                        info: info.clone(),
                    },
                );
                variants.push(variant);
            }
        }
    }

    Ok(VariantCollection::new(
        variants,
        metadata,
        path.map(str::to_string),
    ))
}

///
/// Load a [`VariantCollection`] through the chunked dataframe path.
///
/// Typically faster than [`load_vcf`], especially with
/// `include_info = false`. Only local files are supported; URLs fall back
/// to the streaming path. The header is opened once to grab metadata for
/// reference inference, then the data lines are parsed in chunks.
///
/// # Arguments
/// - path: path to a `.vcf`/`.vcf.gz` file, or a URL (delegated)
/// - options: see [`LoadOptions`]
pub fn load_vcf_fast(path: &str, options: &LoadOptions) -> Result<VariantCollection> {
    let local = match split_scheme(path) {
        Some((scheme, rest)) if scheme == "file" => file_url_path(rest).to_string(),
        // The dataframe reader only handles local files; remote sources
        // take the streaming path instead.
        Some(_) => return load_vcf(path, options),
        None => path.to_string(),
    };

    // Opened just long enough to read the header metadata.
    let handle = VcfHandle::open(local.as_str())?;
    let header_metadata = handle.reader.metadata.clone();
    handle.close();

    let genome = resolve_genome(&header_metadata, options, Some(path))?;
    let chunks = read_vcf_into_dataframes(
        Path::new(&local),
        options.include_info,
        options.chunk_size,
    )?;
    let info_parser = options
        .include_info
        .then_some(parse_info as fn(&str) -> InfoMap);

    dataframes_to_variant_collection(
        chunks,
        info_parser,
        options.only_passing,
        options.max_variants,
        genome,
        options.allow_extended_nucleotides,
        Some(path),
    )
}
