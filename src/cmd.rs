use std::{collections::HashMap, str::FromStr};

use anyhow::anyhow;

/// Command-line values split into positional symbols and `key=value` pairs.
#[derive(Debug)]
pub struct ArgVals {
    pub simple_vals: Vec<String>,
    pub mapped_vals: HashMap<String, String>,
}

impl ArgVals {
    pub fn from_args<I: IntoIterator<Item = String>>(args: I) -> Self {
        let mut simple_vals = vec![];
        let mut mapped_vals = HashMap::default();
        for arg in args {
            if arg.contains("=") {
                let parts = arg.split("=").collect::<Vec<_>>();
                if parts.len() == 2 {
                    mapped_vals.insert(parts[0].to_string(), parts[1].to_string());
                } else {
                    simple_vals.push(arg);
                }
            } else {
                simple_vals.push(arg);
            }
        }
        Self {
            simple_vals,
            mapped_vals,
        }
    }

    pub fn len(&self) -> usize {
        self.simple_vals.len() + self.mapped_vals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn has_flag(&self, flag: &str) -> bool {
        self.simple_vals.iter().any(|s| s == flag)
    }

    pub fn get_symbol(&self, i: usize) -> Option<&str> {
        self.simple_vals.get(i).map(|s| s.as_str())
    }

    /// Positional value `i`, parsed.
    pub fn get_positional<T>(&self, i: usize) -> anyhow::Result<Option<T>>
    where
        T: FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        self.get_symbol(i)
            .map(|s| s.parse::<T>().map_err(|e| anyhow!("argument {} ('{s}'): {e}", i + 1)))
            .transpose()
    }

    pub fn get_value<T>(&self, key: &str) -> anyhow::Result<Option<T>>
    where
        T: FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        self.mapped_vals
            .get(key)
            .map(|s| s.parse::<T>().map_err(|e| anyhow!("{key}={s}: {e}")))
            .transpose()
    }

    /// A `key=a,b` pair.
    pub fn get_duple<T>(&self, key: &str) -> anyhow::Result<Option<(T, T)>>
    where
        T: FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        let Some(value) = self.mapped_vals.get(key) else {
            return Ok(None);
        };
        let mut parts = value.split(',');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(a), Some(b), None) => {
                let a = a.trim().parse::<T>().map_err(|e| anyhow!("{key}={value}: {e}"))?;
                let b = b.trim().parse::<T>().map_err(|e| anyhow!("{key}={value}: {e}"))?;
                Ok(Some((a, b)))
            }
            _ => Err(anyhow!("{key}={value}: expected two comma-separated values")),
        }
    }
}

impl Default for ArgVals {
    fn default() -> Self {
        Self::from_args(std::env::args().skip(1))
    }
}
