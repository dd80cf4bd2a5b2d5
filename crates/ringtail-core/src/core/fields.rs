use phf::{Map, phf_map};
use serde::{Serialize, Serializer};

/// A per-pose value that can be reported in the results log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputField {
    Energy,
    LigandEfficiency,
    Delta,
    RefRmsd,
    EInter,
    EVdw,
    EElec,
    EIntra,
    NInteract,
    Interactions,
    FileName,
    LigandSmile,
    Rank,
    Run,
    HydrogenBonds,
    SourceFile,
}

static OUTPUT_FIELDS: Map<&'static str, OutputField> = phf_map! {
    "e" => OutputField::Energy,
    "le" => OutputField::LigandEfficiency,
    "delta" => OutputField::Delta,
    "ref_rmsd" => OutputField::RefRmsd,
    "e_inter" => OutputField::EInter,
    "e_vdw" => OutputField::EVdw,
    "e_elec" => OutputField::EElec,
    "e_intra" => OutputField::EIntra,
    "n_interact" => OutputField::NInteract,
    "interactions" => OutputField::Interactions,
    "fname" => OutputField::FileName,
    "ligand_smile" => OutputField::LigandSmile,
    "rank" => OutputField::Rank,
    "run" => OutputField::Run,
    "hb" => OutputField::HydrogenBonds,
    "source_file" => OutputField::SourceFile,
};

impl OutputField {
    pub fn from_token(token: &str) -> Option<Self> {
        OUTPUT_FIELDS.get(token.trim()).copied()
    }

    pub fn token(self) -> &'static str {
        match self {
            OutputField::Energy => "e",
            OutputField::LigandEfficiency => "le",
            OutputField::Delta => "delta",
            OutputField::RefRmsd => "ref_rmsd",
            OutputField::EInter => "e_inter",
            OutputField::EVdw => "e_vdw",
            OutputField::EElec => "e_elec",
            OutputField::EIntra => "e_intra",
            OutputField::NInteract => "n_interact",
            OutputField::Interactions => "interactions",
            OutputField::FileName => "fname",
            OutputField::LigandSmile => "ligand_smile",
            OutputField::Rank => "rank",
            OutputField::Run => "run",
            OutputField::HydrogenBonds => "hb",
            OutputField::SourceFile => "source_file",
        }
    }

    /// Whether results can be sorted by this field.
    pub fn is_orderable(self) -> bool {
        !matches!(
            self,
            OutputField::Interactions
                | OutputField::FileName
                | OutputField::LigandSmile
                | OutputField::SourceFile
        )
    }
}

impl Serialize for OutputField {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.token())
    }
}
