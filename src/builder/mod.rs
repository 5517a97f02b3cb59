mod ec;
mod qr;

pub use qr::{Access, Module, ModuleKind, Stage, QR, QUIET_ZONE_WIDTH};

use tracing::{debug, info};

use crate::common::{
    codec::encode_payload,
    error::QRResult,
    mask::{apply_best_mask, mask_candidate, MaskPattern},
    metadata::{ECLevel, Metadata, Version},
    tables::SpecTables,
};

pub use ec::error_correction_capacity;

pub struct QRBuilder<'a> {
    data: &'a [u8],
    version: Option<Version>,
    ec_level: ECLevel,
    mask: Option<MaskPattern>,
}

impl<'a> QRBuilder<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, version: None, ec_level: ECLevel::M, mask: None }
    }

    pub fn data(&mut self, data: &'a [u8]) -> &mut Self {
        self.data = data;
        self
    }

    pub fn version(&mut self, version: Version) -> &mut Self {
        self.version = Some(version);
        self
    }

    pub fn unset_version(&mut self) -> &mut Self {
        self.version = None;
        self
    }

    pub fn ec_level(&mut self, ec_level: ECLevel) -> &mut Self {
        self.ec_level = ec_level;
        self
    }

    pub fn mask(&mut self, mask: MaskPattern) -> &mut Self {
        self.mask = Some(mask);
        self
    }

    pub fn unset_mask(&mut self) -> &mut Self {
        self.mask = None;
        self
    }

    pub fn metadata(&self) -> String {
        let mask = self.mask.map_or("None".to_string(), |m| (*m).to_string());
        match self.version {
            Some(v) => {
                format!("{{ Version: {}, Ec level: {}, Mask: {} }}", *v, self.ec_level, mask)
            }
            None => format!("{{ Version: None, Ec level: {}, Mask: {} }}", self.ec_level, mask),
        }
    }
}


impl QRBuilder<'_> {
    pub fn build(&self) -> QRResult<QR> {
        let tables = SpecTables::global();
        let qr = self.prepare()?;

        let mut qr = match self.mask {
            Some(m) => {
                debug!(mask = *m, "Applying mask");
                mask_candidate(&qr, m, tables)?
            }
            None => {
                debug!("Finding & applying best mask");
                apply_best_mask(&qr, tables)?
            }
        };
        qr.finalize()?;

        let ver = qr.version();
        let layout = tables.block_layout(ver, self.ec_level);
        let total_modules = qr.width() * qr.width();
        let dark_modules = qr.count_dark_modules();
        info!(
            version = *ver,
            ec_level = %self.ec_level,
            mask = qr.mask().map(|m| *m),
            data_len = self.data.len(),
            data_capacity = tables.capacity(ver, self.ec_level),
            ec_capacity = error_correction_capacity(&layout, ver, self.ec_level),
            dark_modules,
            light_modules = total_modules - dark_modules,
            balance = dark_modules * 100 / total_modules,
            "QR generated"
        );

        Ok(qr)
    }

    /// Runs the pipeline up to data and version placement, leaving the grid ready for masking.
    pub(crate) fn prepare(&self) -> QRResult<QR> {
        let tables = SpecTables::global();
        debug!("Generating QR {}", self.metadata());

        let meta = Metadata::select(tables, self.data.len(), self.ec_level, self.version)?;
        let ver = meta.version;

        debug!("Encoding data");
        let encoded = encode_payload(self.data, &meta)?;

        debug!("Constructing payload with ecc & interleaving");
        let layout = tables.block_layout(ver, self.ec_level);
        let (data_blocks, ecc_blocks) = ec::ecc(encoded.data(), &layout, tables)?;
        let payload =
            ec::interleave_message(&data_blocks, &ecc_blocks, tables.remainder_bits(ver));

        debug!("Drawing function patterns");
        let mut qr = QR::new(ver, self.ec_level);
        qr.draw_function_patterns(tables)?;
        qr.reserve_info_areas()?;

        debug!("Drawing encoding region");
        qr.place_data(&payload)?;
        if *ver >= 7 {
            qr.draw_version_info(tables)?;
        }

        Ok(qr)
    }
}

#[cfg(test)]
mod builder_tests {
    use test_case::test_case;

    use super::{QRBuilder, Stage};
    use crate::common::error::QRError;
    use crate::common::mask::MaskPattern;
    use crate::common::metadata::{ECLevel, Version};
    use crate::common::tables::SpecTables;
    use crate::render::RenderOptions;

    #[test_case(1, ECLevel::L)]
    #[test_case(1, ECLevel::M)]
    #[test_case(1, ECLevel::Q)]
    #[test_case(1, ECLevel::H)]
    #[test_case(7, ECLevel::L)]
    #[test_case(7, ECLevel::M)]
    #[test_case(7, ECLevel::Q)]
    #[test_case(7, ECLevel::H)]
    #[test_case(10, ECLevel::L)]
    #[test_case(10, ECLevel::M)]
    #[test_case(10, ECLevel::Q)]
    #[test_case(10, ECLevel::H)]
    #[test_case(27, ECLevel::L)]
    #[test_case(27, ECLevel::M)]
    #[test_case(27, ECLevel::Q)]
    #[test_case(27, ECLevel::H)]
    #[test_case(40, ECLevel::L)]
    #[test_case(40, ECLevel::M)]
    #[test_case(40, ECLevel::Q)]
    #[test_case(40, ECLevel::H)]
    fn test_builder_full_capacity(v: usize, ec_level: ECLevel) {
        let version = Version::new(v).unwrap();
        let capacity = SpecTables::global().capacity(version, ec_level);
        let data = "B3@j#Z%8vK!3zC^8&rF9*b6aA1".chars().cycle().take(capacity).collect::<String>();

        let qr = QRBuilder::new(data.as_bytes()).ec_level(ec_level).build().unwrap();
        assert_eq!(qr.stage(), Stage::Finalized);
        assert_eq!(qr.version(), version);
        let img = qr.render(&RenderOptions::default().scale(4).unwrap()).unwrap();

        let (w, h) = img.dimensions();
        let mut img = rqrr::PreparedImage::prepare_from_greyscale(w as usize, h as usize, |x, y| {
            img.get_pixel(x as u32, y as u32).0[0]
        });
        let grids = img.detect_grids();
        assert_eq!(grids.len(), 1);
        let (meta, content) = grids[0].decode().unwrap();

        assert_eq!(*version, meta.version.0);
        assert_eq!(data, content);
    }

    #[test]
    fn test_builder_data_overflow() {
        let data = "1234567890".repeat(128);
        let res =
            QRBuilder::new(data.as_bytes()).version(Version::new(40).unwrap()).ec_level(ECLevel::H).build();
        assert_eq!(res.err(), Some(QRError::DataTooLong));
    }

    #[test]
    fn test_builder_forced_mask() {
        let qr = QRBuilder::new(b"forced").mask(MaskPattern::new(6).unwrap()).build().unwrap();
        assert_eq!(qr.mask(), Some(MaskPattern::new(6).unwrap()));
        assert_eq!(qr.ec_level(), ECLevel::M);
        assert_eq!(*qr.version(), 1);
    }

    #[test]
    fn test_builder_empty_payload() {
        let qr = QRBuilder::new(b"").build().unwrap();
        assert_eq!(*qr.version(), 1);
        assert!(qr.is_finalized());
    }

    #[test]
    fn test_builder_deterministic() {
        let data = "The quick brown fox jumps over the lazy dog".repeat(5);
        let a = QRBuilder::new(data.as_bytes()).ec_level(ECLevel::Q).build().unwrap();
        let b = QRBuilder::new(data.as_bytes()).ec_level(ECLevel::Q).build().unwrap();
        assert_eq!(a.grid(), b.grid());
        assert_eq!(a.mask(), b.mask());
    }
}
