//! Reads `station;measurement` lines and produces the report.

use std::{
    fs::File,
    io::{self, BufRead, BufReader, BufWriter, Write},
    time::Instant,
};

use crate::{
    Result, StatsError,
    config::{Config, Input, Strategy},
    line::{split_line, trim_line_end},
    parse::{CustomDecoder, Decoder, FixedDecoder, GeneralDecoder, Tenths},
    summary::StationTable,
};

const READ_BUFFER_SIZE: usize = 1 << 20;

/// Counters for a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunStats {
    pub lines: u64,
    pub stations: usize,
}

/// Folds every line of `reader` into a table, decoding with `D` and
/// recording with `update`.
///
/// Stops at the first line that fails to split or decode; nothing read so
/// far is returned in that case.
pub fn aggregate<D, R, U>(
    reader: &mut R,
    mut update: U,
) -> Result<(StationTable<D::Value>, u64)>
where
    D: Decoder,
    R: BufRead,
    U: FnMut(&mut StationTable<D::Value>, &[u8], D::Value),
{
    let mut table = StationTable::new();
    let mut buffer = Vec::with_capacity(128);
    let mut line_number = 0u64;
    let mut lines = 0u64;
    while reader.read_until(b'\n', &mut buffer)? != 0 {
        line_number += 1;
        let line = trim_line_end(&buffer);
        if !line.is_empty() {
            let (name, measurement) = split_line(line)
                .and_then(|(name, text)| D::decode(text).map(|value| (name, value)))
                .inspect_err(|e| log::debug!("line {}: {}", line_number, e))?;
            update(&mut table, name, measurement);
            lines += 1;
        }
        buffer.clear();
    }
    Ok((table, lines))
}

fn run_with<D, R, W, U>(reader: &mut R, out: &mut W, update: U) -> Result<RunStats>
where
    D: Decoder,
    R: BufRead,
    W: Write,
    U: FnMut(&mut StationTable<D::Value>, &[u8], D::Value),
{
    let (table, lines) = aggregate::<D, _, _>(reader, update)?;
    let stats = RunStats {
        lines,
        stations: table.len(),
    };
    let mut out = BufWriter::new(out);
    table.render(&mut out)?;
    out.flush()?;
    Ok(stats)
}

/// Aggregates `reader` with the given strategy and writes the report to
/// `out`. Nothing is written unless the whole input was read successfully.
pub fn run<R: BufRead, W: Write>(
    strategy: Strategy,
    reader: &mut R,
    out: &mut W,
) -> Result<RunStats> {
    match strategy {
        Strategy::Copy => {
            run_with::<GeneralDecoder, _, _, _>(reader, out, StationTable::<f64>::update_by_copy)
        }
        Strategy::General => {
            run_with::<GeneralDecoder, _, _, _>(reader, out, StationTable::<f64>::update)
        }
        Strategy::Custom => {
            run_with::<CustomDecoder, _, _, _>(reader, out, StationTable::<f64>::update)
        }
        Strategy::Fixed => {
            run_with::<FixedDecoder, _, _, _>(reader, out, StationTable::<Tenths>::update)
        }
    }
}

/// Opens the configured input and runs the configured strategy over it.
pub fn run_input<W: Write>(config: &Config, out: &mut W) -> Result<RunStats> {
    log::info!("Reading {} with strategy {}", config.input, config.strategy);
    let started = Instant::now();
    let stats = match &config.input {
        Input::Stdin => {
            let stdin = io::stdin();
            run(config.strategy, &mut stdin.lock(), out)?
        }
        Input::Path(path) => {
            let file = File::open(path).map_err(|e| {
                StatsError::Io(io::Error::new(e.kind(), format!("{}: {}", path.display(), e)))
            })?;
            run(
                config.strategy,
                &mut BufReader::with_capacity(READ_BUFFER_SIZE, file),
                out,
            )?
        }
    };
    log::info!(
        "Aggregated {} lines into {} stations in {:.3?}",
        stats.lines,
        stats.stations,
        started.elapsed()
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const ALL: [Strategy; 4] = [
        Strategy::Copy,
        Strategy::General,
        Strategy::Custom,
        Strategy::Fixed,
    ];

    fn report(strategy: Strategy, input: &str) -> Result<String> {
        let mut out = Vec::new();
        run(strategy, &mut Cursor::new(input), &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_two_stations() {
        for strategy in ALL {
            assert_eq!(
                report(strategy, "A;10.0\nB;20.0\nA;30.0\n").unwrap(),
                "A\n\tmin: 10.000000\n\tmax: 30.000000\n\tmean: 20.000000\n\
                 B\n\tmin: 20.000000\n\tmax: 20.000000\n\tmean: 20.000000\n",
                "{strategy}"
            );
        }
    }

    #[test]
    fn test_symmetric_values() {
        for strategy in ALL {
            assert_eq!(
                report(strategy, "X;-5.5\nX;5.5\n").unwrap(),
                "X\n\tmin: -5.500000\n\tmax: 5.500000\n\tmean: 0.000000\n",
                "{strategy}"
            );
        }
    }

    #[test]
    fn test_single_line_without_trailing_newline() {
        for strategy in ALL {
            assert_eq!(
                report(strategy, "Oslo;-3.2").unwrap(),
                "Oslo\n\tmin: -3.200000\n\tmax: -3.200000\n\tmean: -3.200000\n",
                "{strategy}"
            );
        }
    }

    #[test]
    fn test_empty_lines_and_crlf() {
        for strategy in ALL {
            assert_eq!(
                report(strategy, "\nA;1.0\r\n\r\nA;3.0\n\n").unwrap(),
                "A\n\tmin: 1.000000\n\tmax: 3.000000\n\tmean: 2.000000\n",
                "{strategy}"
            );
        }
    }

    #[test]
    fn test_empty_input() {
        let mut out = Vec::new();
        let stats = run(Strategy::Custom, &mut Cursor::new(""), &mut out).unwrap();
        assert_eq!(stats, RunStats::default());
        assert!(out.is_empty());
    }

    #[test]
    fn test_run_stats() {
        let mut out = Vec::new();
        let stats = run(
            Strategy::Fixed,
            &mut Cursor::new("a;1.0\nb;2.0\na;3.0\n\nc;4.0\n"),
            &mut out,
        )
        .unwrap();
        assert_eq!(
            stats,
            RunStats {
                lines: 4,
                stations: 3
            }
        );
    }

    #[test]
    fn test_invalid_line_writes_nothing() {
        for strategy in ALL {
            let mut out = Vec::new();
            let err = run(strategy, &mut Cursor::new("A;1.0\nbroken\nB;2.0\n"), &mut out)
                .unwrap_err();
            assert!(matches!(&err, StatsError::InvalidLine(line) if line == "broken"));
            assert!(out.is_empty());
        }
    }

    #[test]
    fn test_malformed_number_writes_nothing() {
        for strategy in ALL {
            for bad in ["A;\n", "A;abc\n", "A;1.2.3\n"] {
                let mut out = Vec::new();
                let err = run(strategy, &mut Cursor::new(format!("B;1.0\n{bad}")), &mut out)
                    .unwrap_err();
                assert!(matches!(err, StatsError::MalformedNumber(_)), "{strategy} {bad:?}");
                assert!(out.is_empty());
            }
        }
    }

    #[test]
    fn test_fixed_rejects_missing_fraction() {
        assert!(matches!(
            report(Strategy::Fixed, "A;12\n"),
            Err(StatsError::MalformedNumber(text)) if text == "12"
        ));
        assert!(matches!(
            report(Strategy::Fixed, "A;1.25\n"),
            Err(StatsError::MalformedNumber(_))
        ));
        assert!(report(Strategy::Custom, "A;12\n").is_ok());
    }

    #[test]
    fn test_fixed_many_largest_values() {
        let input = "A;9999999999999999.9\nB;-9999999999999999.9\n".repeat(1_000);
        assert_eq!(
            report(Strategy::Fixed, &input).unwrap(),
            "A\n\tmin: 10000000000000000.000000\n\tmax: 10000000000000000.000000\n\
             \tmean: 10000000000000000.000000\n\
             B\n\tmin: -10000000000000000.000000\n\tmax: -10000000000000000.000000\n\
             \tmean: -10000000000000000.000000\n"
        );
    }

    struct FailingReader;

    impl io::Read for FailingReader {
        fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::other("disk on fire"))
        }
    }

    #[test]
    fn test_io_failure_propagates() {
        let mut reader = BufReader::new(FailingReader);
        let mut out = Vec::new();
        let err = run(Strategy::General, &mut reader, &mut out).unwrap_err();
        assert!(matches!(err, StatsError::Io(_)));
        assert!(out.is_empty());
    }

    #[test]
    fn test_aggregate_counts() {
        let (table, lines) = aggregate::<FixedDecoder, _, _>(
            &mut Cursor::new("a;1.0\na;-1.0\n"),
            StationTable::<Tenths>::update,
        )
        .unwrap();
        assert_eq!(lines, 2);
        assert_eq!(table.get(b"a").unwrap().count, 2);
    }
}
