// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shared STEP fixture for unit tests

use ifc_edit_parser::StepDocument;

/// Small IFC4 model: a storey, three walls, a slab and a door.
///
/// - #42 `Wall A`: layer-set usage (0.2 concrete + 0.1 insulation), occurrence
///   and type property sets, wall base quantities, rotated placement
/// - #43 `Wall B`: single material, shares `Pset_WallCommon` with #42
/// - #44 `Floor`: direct layer set (0.25 concrete), slab base quantities
/// - #45 `Door`: material list, no placement
/// - #46 `wall a`: same name as #42 when compared case-insensitively
pub const TEST_IFC: &str = r#"ISO-10303-21;
HEADER;
FILE_DESCRIPTION(('ViewDefinition [DesignTransferView]'),'2;1');
FILE_NAME('sample.ifc','2024-05-01T10:00:00',('Tester'),('ifc-edit'),'ifc-edit','fixture','');
FILE_SCHEMA(('IFC4'));
ENDSEC;
DATA;
#1=IFCOWNERHISTORY($,$,$,.ADDED.,$,$,$,0);
#10=IFCCARTESIANPOINT((0.,0.,0.));
#11=IFCAXIS2PLACEMENT3D(#10,$,$);
#12=IFCLOCALPLACEMENT($,#11);
#13=IFCCARTESIANPOINT((1000.,2000.,0.));
#14=IFCDIRECTION((0.,0.,1.));
#15=IFCDIRECTION((0.,1.,0.));
#16=IFCAXIS2PLACEMENT3D(#13,#14,#15);
#17=IFCLOCALPLACEMENT(#12,#16);
#18=IFCCARTESIANPOINT((0.,0.,3000.));
#19=IFCAXIS2PLACEMENT3D(#18,$,$);
#20=IFCBUILDINGSTOREY('0wRwmeCXT2ZOu3HFfKXhCM',#1,'Level 1',$,$,#12,$,$,.ELEMENT.,0.);
#21=IFCLOCALPLACEMENT(#12,#19);
#42=IFCWALL('2O2Fr$t4X7Zf8NOew3FLOH',#1,'Wall A',$,$,#17,$,$,.STANDARD.);
#43=IFCWALL('1kTvXnbbzCWw8lcMd1dR4o',#1,'Wall B',$,$,$,$,$,$);
#44=IFCSLAB('0hGqQp4R1FkvYdPSaX0n5Z',#1,'Floor',$,$,#21,$,$,.FLOOR.);
#45=IFCDOOR('3cUkl32yn9qRSPvBJVyWYp',#1,'Door',$,$,$,$,$,2100.,900.,.DOOR.,.SINGLE_SWING_LEFT.,$);
#46=IFCWALL('2bCdEfGhIjKlMnOpQrStUv',#1,'wall a',$,$,$,$,$,$);
#50=IFCMATERIAL('Concrete','Structural concrete','Structural');
#51=IFCMATERIAL('Insulation',$,$);
#52=IFCMATERIALLAYER(#50,0.2,.F.,'Core',$,$,10);
#53=IFCMATERIALLAYER(#51,0.1,$,'Insulation',$,$,$);
#54=IFCMATERIALLAYERSET((#52,#53),'Wall 300',$);
#55=IFCMATERIALLAYERSETUSAGE(#54,.AXIS2.,.POSITIVE.,-0.15,$);
#56=IFCRELASSOCIATESMATERIAL('1Qx0YlDqX0JBcTzVv5KXc1',#1,$,$,(#42),#55);
#57=IFCMATERIALLAYER(#50,0.25,$,$,$,$,$);
#58=IFCMATERIALLAYERSET((#57),'Slab 250',$);
#59=IFCRELASSOCIATESMATERIAL('2Qx0YlDqX0JBcTzVv5KXc2',#1,$,$,(#44),#58);
#60=IFCRELASSOCIATESMATERIAL('3Qx0YlDqX0JBcTzVv5KXc3',#1,$,$,(#43),#50);
#61=IFCMATERIALLIST((#50,#51));
#62=IFCRELASSOCIATESMATERIAL('0Qx0YlDqX0JBcTzVv5KXc4',#1,$,$,(#45),#61);
#70=IFCPROPERTYSINGLEVALUE('FireRating',$,IFCLABEL('F90'),$);
#71=IFCPROPERTYSINGLEVALUE('IsExternal',$,IFCBOOLEAN(.T.),$);
#72=IFCPROPERTYSET('0Pset0WallCommon000001',#1,'Pset_WallCommon',$,(#70,#71));
#73=IFCRELDEFINESBYPROPERTIES('1Rel0WallCommon000001',#1,$,$,(#42,#43),#72);
#74=IFCPROPERTYSINGLEVALUE('ThermalTransmittance',$,IFCTHERMALTRANSMITTANCEMEASURE(0.24),$);
#75=IFCPROPERTYENUMERATEDVALUE('Finish',$,(IFCLABEL('Painted'),IFCLABEL('Raw')),$);
#76=IFCPROPERTYSET('0Pset0Thermal000000001',#1,'Pset_Thermal',$,(#74,#75));
#77=IFCRELDEFINESBYPROPERTIES('1Rel0Thermal000000001',#1,$,$,(#42),#76);
#80=IFCQUANTITYAREA('GrossFootprintArea',$,$,10.,$);
#81=IFCQUANTITYLENGTH('Length',$,$,5.,$);
#82=IFCELEMENTQUANTITY('0Qto0WallBase000000001',#1,'Qto_WallBaseQuantities',$,$,(#80,#81));
#83=IFCRELDEFINESBYPROPERTIES('1Rel0WallBase00000001',#1,$,$,(#42),#82);
#84=IFCQUANTITYAREA('GrossArea',$,$,20.,$);
#85=IFCELEMENTQUANTITY('0Qto0SlabBase000000001',#1,'Qto_SlabBaseQuantities',$,$,(#84));
#86=IFCRELDEFINESBYPROPERTIES('1Rel0SlabBase00000001',#1,$,$,(#44),#85);
#90=IFCPROPERTYSINGLEVALUE('Density',$,IFCMASSDENSITYMEASURE(2400.),$);
#91=IFCMATERIALPROPERTIES('Pset_MaterialMechanical',$,(#90),#50);
#95=IFCPROPERTYSINGLEVALUE('FireRating',$,IFCLABEL('F30'),$);
#96=IFCPROPERTYSINGLEVALUE('AcousticRating',$,IFCLABEL('R45'),$);
#97=IFCPROPERTYSET('0Pset0TypeCommon000001',#1,'Pset_WallCommon',$,(#95,#96));
#98=IFCWALLTYPE('2Type0BasicWall0000001',#1,'Basic Wall',$,$,(#97),$,$,$,.STANDARD.);
#99=IFCRELDEFINESBYTYPE('3Rel0Type000000000001',#1,$,$,(#42),#98);
ENDSEC;
END-ISO-10303-21;
"#;

/// IFC2X3 layered wall: three-attribute layers, extended material properties
pub const TEST_IFC2X3: &str = r#"ISO-10303-21;
HEADER;
FILE_DESCRIPTION(('ViewDefinition [CoordinationView]'),'2;1');
FILE_NAME('legacy.ifc','2019-01-01T00:00:00',(''),(''),'','legacy','');
FILE_SCHEMA(('IFC2X3'));
ENDSEC;
DATA;
#1=IFCOWNERHISTORY($,$,$,.ADDED.,$,$,$,0);
#5=IFCWALLSTANDARDCASE('0LegacyWall00000000001',#1,'Legacy Wall',$,$,$,$,$);
#6=IFCMATERIAL('Brick');
#7=IFCMATERIALLAYER(#6,0.115,$);
#8=IFCMATERIALLAYERSET((#7),'Brick 115');
#9=IFCMATERIALLAYERSETUSAGE(#8,.AXIS2.,.NEGATIVE.,0.);
#10=IFCRELASSOCIATESMATERIAL('0LegacyRel000000000001',#1,$,$,(#5),#9);
#11=IFCPROPERTYSINGLEVALUE('CompressiveStrength',$,IFCPRESSUREMEASURE(12.),$);
#12=IFCEXTENDEDMATERIALPROPERTIES(#6,(#11),$,'Pset_Masonry');
ENDSEC;
END-ISO-10303-21;
"#;

/// Elements carrying more than one material association
///
/// - #2 `Plastered`: two single materials
/// - #3 `Mixed`: a single material and a layer set
pub const TEST_IFC_MULTI: &str = r#"ISO-10303-21;
HEADER;
FILE_DESCRIPTION(('ViewDefinition [DesignTransferView]'),'2;1');
FILE_NAME('multi.ifc','2024-05-01T10:00:00',(''),(''),'','fixture','');
FILE_SCHEMA(('IFC4'));
ENDSEC;
DATA;
#1=IFCOWNERHISTORY($,$,$,.ADDED.,$,$,$,0);
#2=IFCWALL('0Multi0Plastered000001',#1,'Plastered',$,$,$,$,$,$);
#3=IFCWALL('0Multi0Mixed0000000001',#1,'Mixed',$,$,$,$,$,$);
#10=IFCMATERIAL('A',$,$);
#11=IFCMATERIAL('B',$,$);
#12=IFCRELASSOCIATESMATERIAL('0Multi0Rel00000000001',#1,$,$,(#2),#10);
#13=IFCRELASSOCIATESMATERIAL('0Multi0Rel00000000002',#1,$,$,(#2),#11);
#20=IFCMATERIALLAYER(#11,0.3,$,$,$,$,$);
#21=IFCMATERIALLAYERSET((#20),'B 300',$);
#22=IFCRELASSOCIATESMATERIAL('0Multi0Rel00000000003',#1,$,$,(#3),#10);
#23=IFCRELASSOCIATESMATERIAL('0Multi0Rel00000000004',#1,$,$,(#3),#21);
ENDSEC;
END-ISO-10303-21;
"#;

pub fn sample() -> StepDocument {
    StepDocument::parse(TEST_IFC).unwrap()
}

pub fn legacy() -> StepDocument {
    StepDocument::parse(TEST_IFC2X3).unwrap()
}

pub fn multi() -> StepDocument {
    StepDocument::parse(TEST_IFC_MULTI).unwrap()
}
