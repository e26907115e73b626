/// Inclusive temperature band (°F) that earns a condition the vital-signs bonus.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemperatureRange {
    pub min: f64,
    pub max: f64,
}

impl TemperatureRange {
    pub fn contains(&self, temperature: f64) -> bool {
        temperature >= self.min && temperature <= self.max
    }
}

/// Static reference entry for one condition.
#[derive(Debug)]
pub struct DiseaseProfile {
    pub name: &'static str,
    /// Lowercase keywords matched as substrings of the collected answers.
    pub symptoms: &'static [&'static str],
    pub temperature: Option<TemperatureRange>,
    pub description: &'static str,
    pub medications: &'static [&'static str],
    pub warnings: &'static [&'static str],
}

/// Conditions in declaration order; ties in scoring keep this order.
pub static DISEASE_TABLE: [DiseaseProfile; 3] = [
    DiseaseProfile {
        name: "Acute Bronchitis",
        symptoms: &["cough", "mucus", "chest congestion", "fatigue", "mild fever"],
        temperature: Some(TemperatureRange { min: 99.0, max: 101.0 }),
        description: "Inflammation of the bronchial tubes causing cough and mucus production",
        medications: &[
            "Dextromethorphan (Cough Suppressant)",
            "Guaifenesin (Expectorant)",
            "Acetaminophen (Tylenol)",
            "Ibuprofen (Advil)",
            "Honey (Natural Cough Remedy)",
        ],
        warnings: &["See doctor if cough persists more than 2 weeks"],
    },
    DiseaseProfile {
        name: "Influenza",
        symptoms: &["fever", "body aches", "fatigue", "headache", "cough", "sore throat"],
        temperature: Some(TemperatureRange { min: 100.0, max: 104.0 }),
        description: "Viral infection affecting the respiratory system",
        medications: &[
            "Acetaminophen (Tylenol)",
            "Ibuprofen (Advil)",
            "Pseudoephedrine (Decongestant)",
            "Oseltamivir (Tamiflu)",
            "Zinc Supplements",
        ],
        warnings: &["Seek medical care if symptoms are severe"],
    },
    DiseaseProfile {
        name: "Common Cold",
        symptoms: &["runny nose", "congestion", "sneezing", "sore throat", "mild cough"],
        temperature: Some(TemperatureRange { min: 98.0, max: 100.0 }),
        description: "Viral upper respiratory infection",
        medications: &[
            "Pseudoephedrine (Sudafed)",
            "Dextromethorphan (Robitussin)",
            "Chlorpheniramine (Chlor-Trimeton)",
            "Zinc Lozenges",
            "Vitamin C Supplements",
        ],
        warnings: &["Symptoms typically resolve in 7-10 days"],
    },
];
