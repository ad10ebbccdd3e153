use std::fmt;
use std::str::FromStr;

/// The health measures the lookup service answers for. Matching is exact,
/// case included, against the names used in the rankings data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Measure {
    ViolentCrimeRate,
    Unemployment,
    ChildrenInPoverty,
    DiabeticScreening,
    MammographyScreening,
    PreventableHospitalStays,
    Uninsured,
    SexuallyTransmittedInfections,
    PhysicalInactivity,
    AdultObesity,
    PrematureDeath,
    DailyFineParticulateMatter,
}

impl Measure {
    pub const ALL: [Measure; 12] = [
        Measure::ViolentCrimeRate,
        Measure::Unemployment,
        Measure::ChildrenInPoverty,
        Measure::DiabeticScreening,
        Measure::MammographyScreening,
        Measure::PreventableHospitalStays,
        Measure::Uninsured,
        Measure::SexuallyTransmittedInfections,
        Measure::PhysicalInactivity,
        Measure::AdultObesity,
        Measure::PrematureDeath,
        Measure::DailyFineParticulateMatter,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Measure::ViolentCrimeRate => "Violent crime rate",
            Measure::Unemployment => "Unemployment",
            Measure::ChildrenInPoverty => "Children in poverty",
            Measure::DiabeticScreening => "Diabetic screening",
            Measure::MammographyScreening => "Mammography screening",
            Measure::PreventableHospitalStays => "Preventable hospital stays",
            Measure::Uninsured => "Uninsured",
            Measure::SexuallyTransmittedInfections => "Sexually transmitted infections",
            Measure::PhysicalInactivity => "Physical inactivity",
            Measure::AdultObesity => "Adult obesity",
            Measure::PrematureDeath => "Premature Death",
            Measure::DailyFineParticulateMatter => "Daily fine particulate matter",
        }
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMeasure(pub String);

impl FromStr for Measure {
    type Err = UnknownMeasure;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Measure::ALL
            .iter()
            .copied()
            .find(|measure| measure.as_str() == s)
            .ok_or_else(|| UnknownMeasure(s.to_string()))
    }
}
