//! Brazilian federal-unit region codes.
//!
//! Claim extracts carry the region either as the two-digit IBGE code or as
//! the two-letter abbreviation. Both forms normalize to [`RegionCode`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// First-level administrative regions (27 federal units).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RegionCode {
    /// Rondônia
    Rondonia,

    /// Acre
    Acre,

    /// Amazonas
    Amazonas,

    /// Roraima
    Roraima,

    /// Pará
    Para,

    /// Amapá
    Amapa,

    /// Tocantins
    Tocantins,

    /// Maranhão
    Maranhao,

    /// Piauí
    Piaui,

    /// Ceará
    Ceara,

    /// Rio Grande do Norte
    RioGrandeDoNorte,

    /// Paraíba
    Paraiba,

    /// Pernambuco
    Pernambuco,

    /// Alagoas
    Alagoas,

    /// Sergipe
    Sergipe,

    /// Bahia
    Bahia,

    /// Minas Gerais
    MinasGerais,

    /// Espírito Santo
    EspiritoSanto,

    /// Rio de Janeiro
    RioDeJaneiro,

    /// São Paulo
    SaoPaulo,

    /// Paraná
    Parana,

    /// Santa Catarina
    SantaCatarina,

    /// Rio Grande do Sul
    RioGrandeDoSul,

    /// Mato Grosso do Sul
    MatoGrossoDoSul,

    /// Mato Grosso
    MatoGrosso,

    /// Goiás
    Goias,

    /// Distrito Federal
    DistritoFederal,
}

impl RegionCode {
    /// Returns all regions in code order.
    pub const fn all() -> [Self; 27] {
        [
            Self::Rondonia,
            Self::Acre,
            Self::Amazonas,
            Self::Roraima,
            Self::Para,
            Self::Amapa,
            Self::Tocantins,
            Self::Maranhao,
            Self::Piaui,
            Self::Ceara,
            Self::RioGrandeDoNorte,
            Self::Paraiba,
            Self::Pernambuco,
            Self::Alagoas,
            Self::Sergipe,
            Self::Bahia,
            Self::MinasGerais,
            Self::EspiritoSanto,
            Self::RioDeJaneiro,
            Self::SaoPaulo,
            Self::Parana,
            Self::SantaCatarina,
            Self::RioGrandeDoSul,
            Self::MatoGrossoDoSul,
            Self::MatoGrosso,
            Self::Goias,
            Self::DistritoFederal,
        ]
    }

    /// Returns the two-digit region code.
    pub const fn code(&self) -> u8 {
        match self {
            Self::Rondonia => 11,
            Self::Acre => 12,
            Self::Amazonas => 13,
            Self::Roraima => 14,
            Self::Para => 15,
            Self::Amapa => 16,
            Self::Tocantins => 17,
            Self::Maranhao => 21,
            Self::Piaui => 22,
            Self::Ceara => 23,
            Self::RioGrandeDoNorte => 24,
            Self::Paraiba => 25,
            Self::Pernambuco => 26,
            Self::Alagoas => 27,
            Self::Sergipe => 28,
            Self::Bahia => 29,
            Self::MinasGerais => 31,
            Self::EspiritoSanto => 32,
            Self::RioDeJaneiro => 33,
            Self::SaoPaulo => 35,
            Self::Parana => 41,
            Self::SantaCatarina => 42,
            Self::RioGrandeDoSul => 43,
            Self::MatoGrossoDoSul => 50,
            Self::MatoGrosso => 51,
            Self::Goias => 52,
            Self::DistritoFederal => 53,
        }
    }

    /// Returns the two-letter abbreviation.
    pub const fn abbreviation(&self) -> &'static str {
        match self {
            Self::Rondonia => "RO",
            Self::Acre => "AC",
            Self::Amazonas => "AM",
            Self::Roraima => "RR",
            Self::Para => "PA",
            Self::Amapa => "AP",
            Self::Tocantins => "TO",
            Self::Maranhao => "MA",
            Self::Piaui => "PI",
            Self::Ceara => "CE",
            Self::RioGrandeDoNorte => "RN",
            Self::Paraiba => "PB",
            Self::Pernambuco => "PE",
            Self::Alagoas => "AL",
            Self::Sergipe => "SE",
            Self::Bahia => "BA",
            Self::MinasGerais => "MG",
            Self::EspiritoSanto => "ES",
            Self::RioDeJaneiro => "RJ",
            Self::SaoPaulo => "SP",
            Self::Parana => "PR",
            Self::SantaCatarina => "SC",
            Self::RioGrandeDoSul => "RS",
            Self::MatoGrossoDoSul => "MS",
            Self::MatoGrosso => "MT",
            Self::Goias => "GO",
            Self::DistritoFederal => "DF",
        }
    }

    /// Returns the full region name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Rondonia => "Rondônia",
            Self::Acre => "Acre",
            Self::Amazonas => "Amazonas",
            Self::Roraima => "Roraima",
            Self::Para => "Pará",
            Self::Amapa => "Amapá",
            Self::Tocantins => "Tocantins",
            Self::Maranhao => "Maranhão",
            Self::Piaui => "Piauí",
            Self::Ceara => "Ceará",
            Self::RioGrandeDoNorte => "Rio Grande do Norte",
            Self::Paraiba => "Paraíba",
            Self::Pernambuco => "Pernambuco",
            Self::Alagoas => "Alagoas",
            Self::Sergipe => "Sergipe",
            Self::Bahia => "Bahia",
            Self::MinasGerais => "Minas Gerais",
            Self::EspiritoSanto => "Espírito Santo",
            Self::RioDeJaneiro => "Rio de Janeiro",
            Self::SaoPaulo => "São Paulo",
            Self::Parana => "Paraná",
            Self::SantaCatarina => "Santa Catarina",
            Self::RioGrandeDoSul => "Rio Grande do Sul",
            Self::MatoGrossoDoSul => "Mato Grosso do Sul",
            Self::MatoGrosso => "Mato Grosso",
            Self::Goias => "Goiás",
            Self::DistritoFederal => "Distrito Federal",
        }
    }

    /// Parse a region from its code.
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            11 => Some(Self::Rondonia),
            12 => Some(Self::Acre),
            13 => Some(Self::Amazonas),
            14 => Some(Self::Roraima),
            15 => Some(Self::Para),
            16 => Some(Self::Amapa),
            17 => Some(Self::Tocantins),
            21 => Some(Self::Maranhao),
            22 => Some(Self::Piaui),
            23 => Some(Self::Ceara),
            24 => Some(Self::RioGrandeDoNorte),
            25 => Some(Self::Paraiba),
            26 => Some(Self::Pernambuco),
            27 => Some(Self::Alagoas),
            28 => Some(Self::Sergipe),
            29 => Some(Self::Bahia),
            31 => Some(Self::MinasGerais),
            32 => Some(Self::EspiritoSanto),
            33 => Some(Self::RioDeJaneiro),
            35 => Some(Self::SaoPaulo),
            41 => Some(Self::Parana),
            42 => Some(Self::SantaCatarina),
            43 => Some(Self::RioGrandeDoSul),
            50 => Some(Self::MatoGrossoDoSul),
            51 => Some(Self::MatoGrosso),
            52 => Some(Self::Goias),
            53 => Some(Self::DistritoFederal),
            _ => None,
        }
    }

    /// Parse a region from its abbreviation (exact, uppercase).
    pub fn from_abbreviation(abbreviation: &str) -> Option<Self> {
        match abbreviation {
            "RO" => Some(Self::Rondonia),
            "AC" => Some(Self::Acre),
            "AM" => Some(Self::Amazonas),
            "RR" => Some(Self::Roraima),
            "PA" => Some(Self::Para),
            "AP" => Some(Self::Amapa),
            "TO" => Some(Self::Tocantins),
            "MA" => Some(Self::Maranhao),
            "PI" => Some(Self::Piaui),
            "CE" => Some(Self::Ceara),
            "RN" => Some(Self::RioGrandeDoNorte),
            "PB" => Some(Self::Paraiba),
            "PE" => Some(Self::Pernambuco),
            "AL" => Some(Self::Alagoas),
            "SE" => Some(Self::Sergipe),
            "BA" => Some(Self::Bahia),
            "MG" => Some(Self::MinasGerais),
            "ES" => Some(Self::EspiritoSanto),
            "RJ" => Some(Self::RioDeJaneiro),
            "SP" => Some(Self::SaoPaulo),
            "PR" => Some(Self::Parana),
            "SC" => Some(Self::SantaCatarina),
            "RS" => Some(Self::RioGrandeDoSul),
            "MS" => Some(Self::MatoGrossoDoSul),
            "MT" => Some(Self::MatoGrosso),
            "GO" => Some(Self::Goias),
            "DF" => Some(Self::DistritoFederal),
            _ => None,
        }
    }

    /// Normalize a raw region value.
    ///
    /// Surrounding whitespace is ignored. Abbreviations map through the lookup
    /// table; anything else must be an integral number (`35` or `35.0`) equal
    /// to one of the 27 codes.
    pub fn parse(raw: &str) -> Option<Self> {
        let value = raw.trim();
        if let Some(region) = Self::from_abbreviation(value) {
            return Some(region);
        }

        let code = match value.parse::<i64>() {
            Ok(code) => code,
            Err(_) => {
                let number = value.parse::<f64>().ok()?;
                if number.fract() != 0.0 {
                    return None;
                }
                number as i64
            }
        };
        u8::try_from(code).ok().and_then(Self::from_code)
    }
}

impl fmt::Display for RegionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_all_regions() {
        let regions = RegionCode::all();
        assert_eq!(regions.len(), 27);

        for region in regions {
            assert_eq!(RegionCode::from_code(region.code()), Some(region));
            assert_eq!(
                RegionCode::from_abbreviation(region.abbreviation()),
                Some(region)
            );
        }
    }

    #[test]
    fn test_codes_are_unique_and_sorted() {
        let codes: Vec<u8> = RegionCode::all().iter().map(RegionCode::code).collect();
        let mut sorted = codes.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(codes, sorted);
    }

    #[rstest]
    #[case("SP", Some(RegionCode::SaoPaulo))]
    #[case("35", Some(RegionCode::SaoPaulo))]
    #[case(" 35 ", Some(RegionCode::SaoPaulo))]
    #[case("35.0", Some(RegionCode::SaoPaulo))]
    #[case(" DF", Some(RegionCode::DistritoFederal))]
    #[case("11", Some(RegionCode::Rondonia))]
    #[case("XX", None)]
    #[case("sp", None)]
    #[case("35.5", None)]
    #[case("10", None)]
    #[case("99", None)]
    #[case("-35", None)]
    #[case("1035", None)]
    #[case("", None)]
    #[case("NaN", None)]
    fn test_parse(#[case] raw: &str, #[case] expected: Option<RegionCode>) {
        assert_eq!(RegionCode::parse(raw), expected);
    }

    #[test]
    fn test_display_is_numeric_code() {
        assert_eq!(RegionCode::SaoPaulo.to_string(), "35");
        assert_eq!(RegionCode::Acre.name(), "Acre");
    }

    #[test]
    fn test_lookup_tables_are_consistent() {
        let mut names: Vec<&str> = RegionCode::all().iter().map(RegionCode::name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 27);

        for region in RegionCode::all() {
            assert_eq!(RegionCode::from_code(region.code()), Some(region));
            assert_eq!(RegionCode::from_abbreviation(region.abbreviation()), Some(region));
        }
        assert_eq!(RegionCode::SaoPaulo.name(), "São Paulo");
    }
}
