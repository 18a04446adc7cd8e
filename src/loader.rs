use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::Instant;

use polars::prelude::*;
use rayon::prelude::*;
use tracing::{debug, info, instrument, trace};

use crate::domain::TableError;
use crate::record::{RawRecord, reference_dataset};

const NAME: &str = "name";
const DETAIL: &str = "detail";
const NUMERIC_COLUMNS: [&str; 4] = ["calories", "fat", "carbs", "protein"];

#[derive(Debug, PartialEq)]
enum FileType {
    CSV,
    PARQUET,
    ARROW,
}

#[derive(Debug)]
struct FileInfo {
    path: PathBuf,
    file_size: u64,
    file_type: FileType,
}

/// Raw records from `path`, or the built-in dessert table when no path is given.
pub fn load_dataset(path: Option<&str>) -> Result<Vec<RawRecord>, TableError> {
    match path {
        None => {
            info!("Using the built-in dataset");
            Ok(reference_dataset())
        }
        Some(p) => load_data_file(expand_path(p)?),
    }
}

fn expand_path(path: &str) -> Result<PathBuf, TableError> {
    let expanded =
        shellexpand::full(path).map_err(|e| TableError::InvalidPath(format!("{path}: {e}")))?;
    Ok(PathBuf::from(expanded.as_ref()))
}

#[instrument(skip_all, fields(path = %path.display()))]
fn load_data_file(path: PathBuf) -> Result<Vec<RawRecord>, TableError> {
    let file_info = get_file_info(path)?;
    debug!("Loading {:?}", file_info);
    let frame = match file_info.file_type {
        FileType::CSV => load_csv(&file_info.path)?,
        FileType::PARQUET => load_parquet(&file_info.path)?,
        FileType::ARROW => load_arrow(&file_info.path)?,
    };

    let start_time = Instant::now();
    let df = frame.collect()?;
    let records = records_from_frame(&df)?;
    info!(
        "Loaded {} records ({} bytes) in {}ms",
        records.len(),
        file_info.file_size,
        start_time.elapsed().as_millis()
    );
    Ok(records)
}

#[instrument(skip_all, fields(rows = df.height()))]
fn records_from_frame(df: &DataFrame) -> Result<Vec<RawRecord>, TableError> {
    let present: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|c| c.as_str().to_string())
        .collect();
    for required in std::iter::once(NAME).chain(NUMERIC_COLUMNS) {
        if !present.iter().any(|c| c == required) {
            return Err(TableError::loading_failed(format!(
                "missing column \"{required}\", found {present:?}"
            )));
        }
    }

    // Every column is converted in its own rayon task.
    let mut wanted: Vec<&str> = vec![NAME];
    wanted.extend(NUMERIC_COLUMNS);
    if present.iter().any(|c| c == DETAIL) {
        wanted.push(DETAIL);
    }
    let columns: Result<Vec<Vec<Option<String>>>, PolarsError> = wanted
        .par_iter()
        .map(|name| load_column(df, name))
        .collect();
    let columns = columns?;

    let text = |col: usize, row: usize| -> String {
        columns
            .get(col)
            .and_then(|c| c[row].clone())
            .unwrap_or_default()
    };
    let number = |col: usize, row: usize| -> Option<f64> {
        columns[col][row]
            .as_deref()
            .and_then(|s| s.trim().parse::<f64>().ok())
    };

    let records = (0..df.height())
        .map(|row| RawRecord {
            name: text(0, row),
            calories: number(1, row),
            fat: number(2, row),
            carbs: number(3, row),
            protein: number(4, row),
            detail: text(5, row),
        })
        .collect();
    Ok(records)
}

fn load_column(df: &DataFrame, col_name: &str) -> Result<Vec<Option<String>>, PolarsError> {
    let col = df.column(col_name)?.cast(&DataType::String)?;
    let series = col.str()?;
    let data: Vec<Option<String>> = series
        .into_iter()
        .map(|value| value.map(|s| s.replace("\r\n", " ").replace('\n', " ")))
        .collect();
    trace!("Column \"{col_name}\": {} values", data.len());
    Ok(data)
}

fn detect_file_type(path: &std::path::Path) -> Result<FileType, TableError> {
    match path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_uppercase())
        .as_deref()
    {
        Some("CSV") => Ok(FileType::CSV),
        Some("PARQUET") | Some("PQ") => Ok(FileType::PARQUET),
        Some("ARROW") | Some("IPC") | Some("FEATHER") => Ok(FileType::ARROW),
        _ => Err(TableError::UnknownFileType),
    }
}

fn get_file_info(path: PathBuf) -> Result<FileInfo, TableError> {
    let metadata = fs::metadata(&path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => TableError::FileNotFound,
        ErrorKind::PermissionDenied => TableError::PermissionDenied,
        _ => TableError::IoError(e),
    })?;
    if !metadata.is_file() {
        return Err(TableError::loading_failed("not a file"));
    }

    let file_type = detect_file_type(&path)?;

    Ok(FileInfo {
        file_size: metadata.len(),
        path,
        file_type,
    })
}

fn load_csv(path: &PathBuf) -> Result<LazyFrame, PolarsError> {
    LazyCsvReader::new(PlPath::Local(path.as_path().into()))
        .with_has_header(true)
        .finish()
}

fn load_parquet(path: &PathBuf) -> Result<LazyFrame, PolarsError> {
    LazyFrame::scan_parquet(
        PlPath::Local(path.as_path().into()),
        ScanArgsParquet::default(),
    )
}

fn load_arrow(path: &PathBuf) -> Result<LazyFrame, PolarsError> {
    LazyFrame::scan_ipc(
        PlPath::Local(path.as_path().into()),
        polars::io::ipc::IpcScanOptions,
        UnifiedScanArgs::default(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn write_temp(name: &str, content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("tabview-loader-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn no_path_gives_reference_dataset() {
        let records = load_dataset(None).unwrap();
        assert_eq!(records.len(), 5);
        assert_eq!(records[0].name, "Frozen yoghurt");
    }

    #[test]
    fn file_type_from_extension() {
        assert_eq!(detect_file_type(Path::new("a.CSV")).unwrap(), FileType::CSV);
        assert_eq!(detect_file_type(Path::new("a.pq")).unwrap(), FileType::PARQUET);
        assert_eq!(detect_file_type(Path::new("a.feather")).unwrap(), FileType::ARROW);
        assert!(matches!(
            detect_file_type(Path::new("a.xlsx")),
            Err(TableError::UnknownFileType)
        ));
    }

    #[test]
    fn missing_file_is_reported() {
        let err = load_dataset(Some("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, TableError::FileNotFound));
    }

    #[test]
    fn csv_rows_become_raw_records() {
        let path = write_temp(
            "desserts.csv",
            "name,calories,fat,carbs,protein,detail\n\
             Brownie,466,29,50,6.2,Chocolate\n\
             Sorbet,,0,31,0.5,\n",
        );
        let records = load_dataset(path.to_str()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "Brownie");
        assert_eq!(records[0].calories, Some(466.0));
        assert_eq!(records[0].protein, Some(6.2));
        assert_eq!(records[0].detail, "Chocolate");
        assert_eq!(records[1].calories, None);
        assert_eq!(records[1].detail, "");
    }

    #[test]
    fn detail_column_is_optional() {
        let path = write_temp(
            "no_detail.csv",
            "name,calories,fat,carbs,protein\nFlan,150,4,22,5\n",
        );
        let records = load_dataset(path.to_str()).unwrap();
        assert_eq!(records[0].detail, "");
        assert_eq!(records[0].carbs, Some(22.0));
    }

    #[test]
    fn missing_required_column_fails() {
        let path = write_temp("no_fat.csv", "name,calories,carbs,protein\nFlan,150,22,5\n");
        let err = load_dataset(path.to_str()).unwrap_err();
        match err {
            TableError::LoadingFailed { reason, .. } => assert!(reason.contains("\"fat\"")),
            other => panic!("unexpected error {other:?}"),
        }
    }
}
