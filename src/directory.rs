use serde::Deserialize;
use anyhow::Result;

#[derive(Debug, Clone, Deserialize)]
pub struct Doctor {
    pub name: String,
    pub specialty: String,
    pub location: String,
    pub availability: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Medicine {
    pub name: String,
    pub uses: String,
    pub dosage: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Hospital {
    pub name: String,
    pub address: String,
    pub phone: String,
}

/// Reference listings shown in the Doctors, Medicines and Hospitals
/// sections. Shipped embedded; the service does not serve these.
#[derive(Debug, Clone, Deserialize)]
pub struct Directory {
    pub doctors: Vec<Doctor>,
    pub medicines: Vec<Medicine>,
    pub hospitals: Vec<Hospital>,
}

const DIRECTORY_JSON: &str = include_str!("../data/directory.json");

impl Directory {
    pub fn load_builtin() -> Result<Self> {
        let directory: Directory = serde_json::from_str(DIRECTORY_JSON)?;
        Ok(directory)
    }
}

impl Doctor {
    /// Case-insensitive substring match over name and specialty.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.name.to_lowercase().contains(&query)
            || self.specialty.to_lowercase().contains(&query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doctor(name: &str, specialty: &str) -> Doctor {
        Doctor {
            name: name.to_string(),
            specialty: specialty.to_string(),
            location: String::new(),
            availability: String::new(),
        }
    }

    #[test]
    fn test_matches_specialty_case_insensitive() {
        let d = doctor("Dr. Sarah Johnson", "Cardiologist");
        assert!(d.matches("cardio"));
        assert!(d.matches("CARDIO"));
        assert!(!d.matches("derma"));
    }

    #[test]
    fn test_matches_name() {
        let d = doctor("Dr. Sarah Johnson", "Cardiologist");
        assert!(d.matches("johnson"));
    }

    #[test]
    fn test_empty_query_matches_everything() {
        let d = doctor("Dr. Sarah Johnson", "Cardiologist");
        assert!(d.matches(""));
    }

    #[test]
    fn test_builtin_directory_loads() {
        let directory = Directory::load_builtin().unwrap();
        assert!(!directory.doctors.is_empty());
        assert!(!directory.medicines.is_empty());
        assert!(!directory.hospitals.is_empty());
    }
}
