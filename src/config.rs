use crate::index::Htslib;
use crate::{Error, Result};
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "htscatalog")]
#[command(about = "Index genomic track files and serve them with their references")]
pub struct Config {
    /// Host address to bind to
    #[arg(long, env = "HTSCATALOG_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "HTSCATALOG_PORT", default_value = "5000")]
    pub port: u16,

    /// Directory of BAM and bedGraph files, flat or one level of groups
    #[arg(short, long, env = "HTSCATALOG_BAM")]
    pub bam: PathBuf,

    /// GTF annotation, plain or gzipped
    #[arg(short, long, env = "HTSCATALOG_GTF")]
    pub gtf: PathBuf,

    /// FASTA reference
    #[arg(short, long, env = "HTSCATALOG_FASTA")]
    pub fasta: PathBuf,

    /// Where to write the catalog JSON
    #[arg(long, env = "HTSCATALOG_CATALOG", default_value = "catalog.json")]
    pub catalog: PathBuf,

    /// Skip sorting the annotation unless tabix rejects it
    #[arg(long)]
    pub no_sort: bool,

    /// Enable CORS for all origins
    #[arg(long, env = "HTSCATALOG_CORS")]
    pub cors: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    /// bgzip executable
    #[arg(long, env = "HTSCATALOG_BGZIP", default_value = "bgzip")]
    pub bgzip: String,

    /// tabix executable
    #[arg(long, env = "HTSCATALOG_TABIX", default_value = "tabix")]
    pub tabix: String,

    /// samtools executable
    #[arg(long, env = "HTSCATALOG_SAMTOOLS", default_value = "samtools")]
    pub samtools: String,
}

impl Config {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn toolkit(&self) -> Htslib {
        Htslib::new(&self.bgzip, &self.tabix, &self.samtools)
    }

    /// Check the input paths before any indexing starts.
    pub fn validate(&self) -> Result<()> {
        if !self.bam.is_dir() {
            return Err(Error::InvalidInput(format!(
                "track directory {} does not exist",
                self.bam.display()
            )));
        }
        for (what, path) in [("annotation", &self.gtf), ("reference", &self.fasta)] {
            if !path.is_file() {
                return Err(Error::InvalidInput(format!(
                    "{what} file {} does not exist",
                    path.display()
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(args: &[&str]) -> Config {
        let mut argv = vec!["htscatalog", "-b", "bams", "-g", "genes.gtf", "-f", "genome.fa"];
        argv.extend_from_slice(args);
        Config::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]);
        assert_eq!(config.bind_addr(), "127.0.0.1:5000");
        assert_eq!(config.catalog, PathBuf::from("catalog.json"));
        assert!(!config.no_sort);
        assert!(!config.cors);
    }

    #[test]
    fn test_custom_bind_addr() {
        let config = config(&["--host", "0.0.0.0", "--port", "8080"]);
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn test_inputs_are_required() {
        assert!(Config::try_parse_from(["htscatalog", "-b", "bams"]).is_err());
    }

    #[test]
    fn test_validate_reports_missing_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(&[]);
        config.bam = dir.path().to_path_buf();
        config.gtf = dir.path().join("genes.gtf");
        config.fasta = dir.path().join("genome.fa");
        std::fs::write(&config.gtf, b"").unwrap();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("genome.fa"));

        std::fs::write(&config.fasta, b"").unwrap();
        config.validate().unwrap();
    }
}
