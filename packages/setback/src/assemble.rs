//! Packages an inset into the [`BuildableAreaResult`] response contract.

use site_planner_geometry::{LocalProjection, Point, Polygon, signed_area};
use site_planner_setback_models::{
    BuildableAreaResult, CalculationMethod, ClassificationSource, CoordinateSpace,
    EdgeClassification, EdgeSetbackDetail, ResolvedRequirements,
};

use crate::inset::{Inset, details_by_edge};

/// Builder for one [`BuildableAreaResult`].
///
/// Areas are always computed in planar meters; coordinates are converted
/// back to the caller's space only on the way out.
pub struct ResultAssembler<'a> {
    site: &'a Polygon,
    projection: Option<LocalProjection>,
    coordinate_space: CoordinateSpace,
    classification_source: ClassificationSource,
    requirements: ResolvedRequirements,
    setbacks: Vec<EdgeSetbackDetail>,
    inset: Option<Inset>,
}

impl<'a> ResultAssembler<'a> {
    #[must_use]
    pub const fn new(
        site: &'a Polygon,
        projection: Option<LocalProjection>,
        coordinate_space: CoordinateSpace,
    ) -> Self {
        Self {
            site,
            projection,
            coordinate_space,
            classification_source: ClassificationSource::Default,
            requirements: ResolvedRequirements::fallback(),
            setbacks: Vec::new(),
            inset: None,
        }
    }

    #[must_use]
    pub fn classification(mut self, classification: &EdgeClassification) -> Self {
        self.classification_source = classification.source();
        self
    }

    #[must_use]
    pub fn requirements(mut self, requirements: &ResolvedRequirements) -> Self {
        self.requirements = requirements.clone();
        self
    }

    #[must_use]
    pub fn setbacks(mut self, setbacks: Vec<EdgeSetbackDetail>) -> Self {
        self.setbacks = setbacks;
        self
    }

    #[must_use]
    pub fn inset(mut self, inset: Inset) -> Self {
        self.inset = Some(inset);
        self
    }

    /// Computes areas and coverage and converts the buildable ring to the
    /// output coordinate space. A missing inset assembles as degenerate.
    #[must_use]
    pub fn assemble(self) -> BuildableAreaResult {
        let site_area_m2 = self.site.area();

        let buildable: &[Point] = self
            .inset
            .as_ref()
            .and_then(Inset::points)
            .unwrap_or_default();

        let calculation_method = if buildable.is_empty() {
            CalculationMethod::DegenerateEmpty
        } else if self.classification_source == ClassificationSource::Default {
            CalculationMethod::FallbackUniform
        } else {
            CalculationMethod::EdgeOffset
        };

        let buildable_area_m2 = signed_area(buildable).abs();
        let coverage_ratio = if site_area_m2 > 0.0 {
            (buildable_area_m2 / site_area_m2).clamp(0.0, 1.0)
        } else {
            0.0
        };

        let buildable_coords = match &self.projection {
            Some(projection) => projection.unproject_all(buildable),
            None => buildable.to_vec(),
        }
        .into_iter()
        .map(Into::into)
        .collect();

        let ResolvedRequirements {
            requirements,
            origin,
            council,
            zone,
        } = self.requirements;

        BuildableAreaResult {
            buildable_coords,
            buildable_area_m2,
            site_area_m2,
            coverage_ratio,
            setback_details: details_by_edge(self.setbacks),
            calculation_method,
            classification_source: self.classification_source,
            requirements,
            requirements_origin: origin,
            council,
            zone,
            coordinate_space: self.coordinate_space,
            error: None,
        }
    }
}
