//! Hospital directory and capability-based destination selection

use log::{info, warn};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use super::error::{DispatchError, DispatchResult};
use super::types::{GeoPoint, HospitalId};

/// Services a hospital can provide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Trauma,
    Cardiac,
    Neuro,
    Burns,
    Icu,
    Pediatric,
    Maternity,
    General,
}

/// Kind of emergency the ambulance is carrying
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaseType {
    Trauma,
    Cardiac,
    /// Stroke and other neurological cases
    Neuro,
    Burns,
    Pediatric,
    General,
}

impl CaseType {
    /// Capability a hospital must offer for this case, if any
    pub fn required_capability(self) -> Option<Capability> {
        match self {
            CaseType::Trauma => Some(Capability::Trauma),
            CaseType::Cardiac => Some(Capability::Cardiac),
            CaseType::Neuro => Some(Capability::Neuro),
            CaseType::Burns => Some(Capability::Burns),
            CaseType::Pediatric => Some(Capability::Pediatric),
            CaseType::General => None,
        }
    }
}

impl FromStr for CaseType {
    type Err = Infallible;

    /// Case-insensitive; unrecognised case types are treated as general
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().as_str() {
            "trauma" => CaseType::Trauma,
            "cardiac" => CaseType::Cardiac,
            "stroke" | "neuro" => CaseType::Neuro,
            "burns" => CaseType::Burns,
            "pediatric" => CaseType::Pediatric,
            _ => CaseType::General,
        })
    }
}

impl fmt::Display for CaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CaseType::Trauma => "trauma",
            CaseType::Cardiac => "cardiac",
            CaseType::Neuro => "neuro",
            CaseType::Burns => "burns",
            CaseType::Pediatric => "pediatric",
            CaseType::General => "general",
        };
        f.write_str(name)
    }
}

/// A hospital the ambulance can be routed to
#[derive(Debug, Clone, PartialEq)]
pub struct Hospital {
    pub id: HospitalId,
    pub name: String,
    pub position: GeoPoint,
    pub capabilities: Vec<Capability>,
    pub icu_beds_available: u32,
    pub specialization: String,
}

impl Hospital {
    pub fn new(
        id: u32,
        name: &str,
        lat: f64,
        lon: f64,
        capabilities: &[Capability],
        icu_beds_available: u32,
        specialization: &str,
    ) -> Self {
        Self {
            id: HospitalId(id),
            name: name.to_string(),
            position: GeoPoint::new(lat, lon),
            capabilities: capabilities.to_vec(),
            icu_beds_available,
            specialization: specialization.to_string(),
        }
    }

    pub fn has(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    /// Whether the hospital can take a case right now
    pub fn accepts(&self, case: CaseType) -> bool {
        if self.icu_beds_available == 0 {
            return false;
        }
        case.required_capability()
            .map_or(true, |capability| self.has(capability))
    }
}

/// Static lookup table of hospitals
#[derive(Debug, Clone, Default)]
pub struct HospitalDirectory {
    hospitals: Vec<Hospital>,
}

impl HospitalDirectory {
    pub fn new(hospitals: Vec<Hospital>) -> Self {
        Self { hospitals }
    }

    /// Hospitals of the Ernakulam district (Kochi region)
    #[rustfmt::skip]
    pub fn ernakulam() -> Self {
        use Capability::*;
        Self::new(vec![
            Hospital::new(1, "Lakeshore Hospital", 9.9312, 76.3200, &[Trauma, Cardiac, Icu, General], 12, "Multi-specialty"),
            Hospital::new(2, "Aster Medcity", 10.0381, 76.2736, &[Trauma, Cardiac, Neuro, Icu, Pediatric], 20, "Multi-specialty"),
            Hospital::new(3, "Ernakulam Medical Centre", 9.9922, 76.3150, &[Cardiac, General, Icu], 5, "General"),
            Hospital::new(4, "General Hospital Ernakulam", 9.9806, 76.2798, &[Trauma, General, Icu], 15, "Government Hospital"),
            Hospital::new(5, "Amrita Hospital", 10.0247, 76.2996, &[Trauma, Cardiac, Neuro, Burns, Icu, Pediatric], 45, "Advanced Multi-specialty"),
            Hospital::new(6, "District Hospital Fort Kochi", 9.9659, 76.2426, &[Trauma, General], 8, "Government Hospital"),
            Hospital::new(7, "Lisie Hospital", 9.9784, 76.2977, &[Trauma, Cardiac, Icu, Maternity], 18, "Multi-specialty"),
            Hospital::new(8, "Renai Medicity", 9.9717, 76.2930, &[Trauma, Cardiac, Icu, General], 10, "Multi-specialty"),
            Hospital::new(9, "Taluk Hospital Aluva", 10.1010, 76.3530, &[Trauma, General], 6, "Government Hospital"),
            Hospital::new(10, "Holy Cross Hospital Aluva", 10.1048, 76.3524, &[Cardiac, General, Maternity], 4, "General"),
            Hospital::new(11, "St. Joseph's Hospital Angamaly", 10.1956, 76.3839, &[Trauma, Cardiac, Icu, General], 9, "Multi-specialty"),
            Hospital::new(12, "Perumbavoor Taluk Hospital", 10.1103, 76.4741, &[Trauma, General], 7, "Government Hospital"),
            Hospital::new(13, "Tripunithura Taluk Hospital", 9.9454, 76.3491, &[Trauma, General], 5, "Government Hospital"),
            Hospital::new(14, "KIMS Hospital Thrikkakara", 10.0289, 76.3419, &[Trauma, Cardiac, Neuro, Icu], 14, "Multi-specialty"),
            Hospital::new(15, "Muvattupuzha District Hospital", 9.9912, 76.5775, &[Trauma, General, Icu], 10, "Government Hospital"),
            Hospital::new(16, "Apollo Adlux Hospital Angamaly", 10.1956, 76.4018, &[Trauma, Cardiac, Neuro, Burns, Icu], 30, "Advanced Multi-specialty"),
            Hospital::new(17, "Baby Memorial Hospital Ernakulam", 9.9985, 76.3033, &[Cardiac, Pediatric, Maternity, General], 8, "General + Pediatric"),
            Hospital::new(18, "PVS Memorial Hospital", 10.0053, 76.3178, &[Trauma, Cardiac, Icu, General], 11, "Multi-specialty"),
        ])
    }

    pub fn len(&self) -> usize {
        self.hospitals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hospitals.is_empty()
    }

    /// Hospitals able to take `case`, in table order
    pub fn filter(&self, case: CaseType) -> Vec<&Hospital> {
        self.hospitals.iter().filter(|h| h.accepts(case)).collect()
    }

    /// Nearest capable hospital to `from`.
    ///
    /// Falls back to the whole directory when nothing is capable; fails only
    /// if the directory itself is empty.
    pub fn select(&self, case: CaseType, from: GeoPoint) -> DispatchResult<&Hospital> {
        let mut candidates = self.filter(case);
        if candidates.is_empty() {
            warn!(
                "No hospital can take a {} case, falling back to the full directory",
                case
            );
            candidates = self.hospitals.iter().collect();
        }

        let mut best: Option<(&Hospital, f64)> = None;
        for hospital in candidates {
            let distance = hospital.position.distance_m(&from);
            if best.map_or(true, |(_, d)| distance < d) {
                best = Some((hospital, distance));
            }
        }

        let (hospital, distance) = best.ok_or_else(|| DispatchError::NoHospital {
            case: case.to_string(),
        })?;
        info!(
            "Selected {} for {} case ({:.0}m away)",
            hospital.name, case, distance
        );
        Ok(hospital)
    }
}
