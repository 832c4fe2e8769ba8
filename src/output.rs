//! Spectrum writers for the command line

use crate::error::{FilterError, FilterResult};
use crate::spectrum::Spectrum;
use std::io::Write;

/// How a spectrum is written out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// `frequency dB` per line
    #[default]
    Text,
    /// Single JSON document
    Json,
}

/// Write one spectrum in the requested format
pub fn write_spectrum<W: Write>(
    out: &mut W,
    spectrum: &Spectrum,
    format: OutputFormat,
) -> FilterResult<()> {
    match format {
        OutputFormat::Text => {
            for bin in &spectrum.bins {
                writeln!(out, "{:.6} {:.6}", bin.frequency_hz, bin.magnitude_db)?;
            }
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, spectrum)
                .map_err(|e| FilterError::Io(e.into()))?;
            writeln!(out)?;
        }
    }
    Ok(())
}

/// Write several spectra side by side: a `#` header naming the taps, then
/// `frequency dB_1 dB_2 ...` per line. All spectra must share the same bins.
pub fn write_table<W: Write>(out: &mut W, spectra: &[Spectrum]) -> FilterResult<()> {
    let Some(first) = spectra.first() else {
        return Ok(());
    };

    if let Some(odd) = spectra.iter().find(|s| s.len() != first.len()) {
        return Err(FilterError::Output(format!(
            "tap {} has {} bins, tap {} has {}",
            odd.tap,
            odd.len(),
            first.tap,
            first.len()
        )));
    }

    write!(out, "# freq")?;
    for spectrum in spectra {
        write!(out, " {}", spectrum.tap)?;
    }
    writeln!(out)?;

    for (i, bin) in first.bins.iter().enumerate() {
        write!(out, "{:.6}", bin.frequency_hz)?;
        for spectrum in spectra {
            write!(out, " {:.6}", spectrum.bins[i].magnitude_db)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spectrum::SpectrumBin;
    use crate::tap::FilterTap;

    fn spectrum(tap: FilterTap, dbs: &[f64]) -> Spectrum {
        Spectrum {
            tap,
            amplitude: 1.0,
            bins: dbs
                .iter()
                .enumerate()
                .map(|(i, &db)| SpectrumBin {
                    frequency_hz: i as f64 * 250.0,
                    magnitude_db: db,
                })
                .collect(),
        }
    }

    #[test]
    fn test_text_lines() {
        let mut out = Vec::new();
        let s = spectrum(FilterTap::LowPass, &[1.5, -99.0]);
        write_spectrum(&mut out, &s, OutputFormat::Text).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "0.000000 1.500000\n250.000000 -99.000000\n");
    }

    #[test]
    fn test_json_document() {
        let mut out = Vec::new();
        let s = spectrum(FilterTap::Notch, &[0.25]);
        write_spectrum(&mut out, &s, OutputFormat::Json).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["tap"], "sum_notch");
        assert_eq!(value["amplitude"], 1.0);
        assert_eq!(value["bins"][0]["magnitude_db"], 0.25);
    }

    #[test]
    fn test_table_columns() {
        let mut out = Vec::new();
        let spectra = vec![
            spectrum(FilterTap::LowPass, &[1.0, 2.0]),
            spectrum(FilterTap::HighPass, &[-3.0, -4.0]),
        ];
        write_table(&mut out, &spectra).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "# freq Vlp Vhp");
        assert_eq!(lines[1], "0.000000 1.000000 -3.000000");
        assert_eq!(lines[2], "250.000000 2.000000 -4.000000");
    }

    #[test]
    fn test_table_rejects_mismatched_bin_counts() {
        let mut out = Vec::new();
        let spectra = vec![
            spectrum(FilterTap::LowPass, &[1.0, 2.0, 3.0]),
            spectrum(FilterTap::BandPass, &[1.0]),
        ];
        match write_table(&mut out, &spectra) {
            Err(FilterError::Output(msg)) => assert!(msg.contains("Vbp"), "{}", msg),
            other => panic!("expected Output error, got {:?}", other),
        }
        // Nothing is written for a rejected table
        assert!(out.is_empty());
    }

    #[test]
    fn test_empty_table_writes_nothing() {
        let mut out = Vec::new();
        write_table(&mut out, &[]).unwrap();
        assert!(out.is_empty());
    }
}
