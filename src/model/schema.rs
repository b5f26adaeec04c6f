/// Direct supertype of common IFC entity types (IFC4 / IFC4X3 naming).
///
/// Only types used by rules and tests are listed; models can declare more
/// with [`MemoryModel::declare_type`](super::MemoryModel::declare_type).
pub(super) const SUPERTYPES: &[(&str, &str)] = &[
    // roots
    ("IfcObjectDefinition", "IfcRoot"),
    ("IfcRelationship", "IfcRoot"),
    ("IfcPropertyDefinition", "IfcRoot"),
    ("IfcObject", "IfcObjectDefinition"),
    ("IfcContext", "IfcObjectDefinition"),
    ("IfcTypeObject", "IfcObjectDefinition"),
    ("IfcProject", "IfcContext"),
    ("IfcProjectLibrary", "IfcContext"),
    ("IfcProduct", "IfcObject"),
    ("IfcGroup", "IfcObject"),
    ("IfcProcess", "IfcObject"),
    ("IfcResource", "IfcObject"),
    ("IfcControl", "IfcObject"),
    ("IfcActor", "IfcObject"),
    // products
    ("IfcElement", "IfcProduct"),
    ("IfcSpatialElement", "IfcProduct"),
    ("IfcPositioningElement", "IfcProduct"),
    ("IfcAnnotation", "IfcProduct"),
    ("IfcPort", "IfcProduct"),
    ("IfcStructuralItem", "IfcProduct"),
    ("IfcSpatialStructureElement", "IfcSpatialElement"),
    ("IfcSpatialZone", "IfcSpatialElement"),
    ("IfcExternalSpatialStructureElement", "IfcSpatialElement"),
    ("IfcSite", "IfcSpatialStructureElement"),
    ("IfcFacility", "IfcSpatialStructureElement"),
    ("IfcFacilityPart", "IfcSpatialStructureElement"),
    ("IfcBuildingStorey", "IfcSpatialStructureElement"),
    ("IfcSpace", "IfcSpatialStructureElement"),
    ("IfcBuilding", "IfcFacility"),
    ("IfcBridge", "IfcFacility"),
    ("IfcRoad", "IfcFacility"),
    ("IfcRailway", "IfcFacility"),
    ("IfcMarineFacility", "IfcFacility"),
    ("IfcBridgePart", "IfcFacilityPart"),
    ("IfcRoadPart", "IfcFacilityPart"),
    ("IfcRailwayPart", "IfcFacilityPart"),
    ("IfcLinearPositioningElement", "IfcPositioningElement"),
    ("IfcGrid", "IfcPositioningElement"),
    ("IfcReferent", "IfcPositioningElement"),
    ("IfcAlignment", "IfcLinearPositioningElement"),
    ("IfcLinearElement", "IfcProduct"),
    ("IfcAlignmentHorizontal", "IfcLinearElement"),
    ("IfcAlignmentVertical", "IfcLinearElement"),
    ("IfcAlignmentCant", "IfcLinearElement"),
    ("IfcAlignmentSegment", "IfcLinearElement"),
    // elements
    ("IfcBuiltElement", "IfcElement"),
    ("IfcBuildingElement", "IfcElement"),
    ("IfcDistributionElement", "IfcElement"),
    ("IfcFeatureElement", "IfcElement"),
    ("IfcElementAssembly", "IfcElement"),
    ("IfcFurnishingElement", "IfcElement"),
    ("IfcWall", "IfcBuiltElement"),
    ("IfcWallStandardCase", "IfcWall"),
    ("IfcSlab", "IfcBuiltElement"),
    ("IfcBeam", "IfcBuiltElement"),
    ("IfcColumn", "IfcBuiltElement"),
    ("IfcDoor", "IfcBuiltElement"),
    ("IfcWindow", "IfcBuiltElement"),
    ("IfcRoof", "IfcBuiltElement"),
    ("IfcStair", "IfcBuiltElement"),
    ("IfcRailing", "IfcBuiltElement"),
    ("IfcCovering", "IfcBuiltElement"),
    ("IfcPlate", "IfcBuiltElement"),
    ("IfcMember", "IfcBuiltElement"),
    ("IfcFeatureElementSubtraction", "IfcFeatureElement"),
    ("IfcOpeningElement", "IfcFeatureElementSubtraction"),
    // relationships
    ("IfcRelDecomposes", "IfcRelationship"),
    ("IfcRelConnects", "IfcRelationship"),
    ("IfcRelAssigns", "IfcRelationship"),
    ("IfcRelDefines", "IfcRelationship"),
    ("IfcRelAssociates", "IfcRelationship"),
    ("IfcRelDeclares", "IfcRelationship"),
    ("IfcRelAggregates", "IfcRelDecomposes"),
    ("IfcRelNests", "IfcRelDecomposes"),
    ("IfcRelVoidsElement", "IfcRelDecomposes"),
    ("IfcRelProjectsElement", "IfcRelDecomposes"),
    ("IfcRelContainedInSpatialStructure", "IfcRelConnects"),
    ("IfcRelReferencedInSpatialStructure", "IfcRelConnects"),
    ("IfcRelFillsElement", "IfcRelConnects"),
    ("IfcRelConnectsElements", "IfcRelConnects"),
    ("IfcRelSpaceBoundary", "IfcRelConnects"),
    ("IfcRelPositions", "IfcRelConnects"),
    ("IfcRelAssignsToGroup", "IfcRelAssigns"),
    ("IfcRelAssignsToProduct", "IfcRelAssigns"),
    ("IfcRelDefinesByType", "IfcRelDefines"),
    ("IfcRelDefinesByProperties", "IfcRelDefines"),
    ("IfcRelAssociatesMaterial", "IfcRelAssociates"),
    // representation
    ("IfcProductDefinitionShape", "IfcProductRepresentation"),
    ("IfcShapeModel", "IfcRepresentation"),
    ("IfcShapeRepresentation", "IfcShapeModel"),
    ("IfcTopologyRepresentation", "IfcShapeModel"),
    ("IfcStyledRepresentation", "IfcRepresentation"),
    // geometry and topology
    ("IfcGeometricRepresentationItem", "IfcRepresentationItem"),
    ("IfcTopologicalRepresentationItem", "IfcRepresentationItem"),
    ("IfcPoint", "IfcGeometricRepresentationItem"),
    ("IfcCartesianPoint", "IfcPoint"),
    ("IfcCartesianPointList", "IfcGeometricRepresentationItem"),
    ("IfcCartesianPointList2D", "IfcCartesianPointList"),
    ("IfcCartesianPointList3D", "IfcCartesianPointList"),
    ("IfcTessellatedItem", "IfcGeometricRepresentationItem"),
    ("IfcTessellatedFaceSet", "IfcTessellatedItem"),
    ("IfcTriangulatedFaceSet", "IfcTessellatedFaceSet"),
    ("IfcTriangulatedIrregularNetwork", "IfcTriangulatedFaceSet"),
    ("IfcPolygonalFaceSet", "IfcTessellatedFaceSet"),
    ("IfcIndexedPolygonalFace", "IfcTessellatedItem"),
    ("IfcIndexedPolygonalFaceWithVoids", "IfcIndexedPolygonalFace"),
    ("IfcConnectedFaceSet", "IfcTopologicalRepresentationItem"),
    ("IfcClosedShell", "IfcConnectedFaceSet"),
    ("IfcOpenShell", "IfcConnectedFaceSet"),
    ("IfcFace", "IfcTopologicalRepresentationItem"),
    ("IfcFaceSurface", "IfcFace"),
    ("IfcFaceBound", "IfcTopologicalRepresentationItem"),
    ("IfcFaceOuterBound", "IfcFaceBound"),
    ("IfcLoop", "IfcTopologicalRepresentationItem"),
    ("IfcPolyLoop", "IfcLoop"),
    ("IfcEdgeLoop", "IfcLoop"),
    ("IfcVertexLoop", "IfcLoop"),
    ("IfcEdge", "IfcTopologicalRepresentationItem"),
    ("IfcOrientedEdge", "IfcEdge"),
    ("IfcEdgeCurve", "IfcEdge"),
    ("IfcSubedge", "IfcEdge"),
    ("IfcVertex", "IfcTopologicalRepresentationItem"),
    ("IfcVertexPoint", "IfcVertex"),
    ("IfcSolidModel", "IfcGeometricRepresentationItem"),
    ("IfcManifoldSolidBrep", "IfcSolidModel"),
    ("IfcFacetedBrep", "IfcManifoldSolidBrep"),
    ("IfcAdvancedBrep", "IfcManifoldSolidBrep"),
    ("IfcSweptAreaSolid", "IfcSolidModel"),
    ("IfcExtrudedAreaSolid", "IfcSweptAreaSolid"),
];
