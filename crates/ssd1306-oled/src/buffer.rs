use bitvec::vec::BitVec;

/// How the picture is laid onto the panel.
///
/// `Normal` is right way up for the common breakout boards, which mount the glass with SEG0 on
/// the right: columns are remapped by the controller and rows are reversed when packing.
/// `Flipped` turns that 180 degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Orientation {
	#[default]
	Normal,
	Flipped,
}

/// A one-bit-per-pixel image.
///
/// Pixels are stored row-major; `true` is a lit pixel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bitmap {
	pub width: u16,
	pub height: u16,
	pub data: BitVec,
}

impl Bitmap {
	/// A blank (all dark) bitmap.
	pub fn new(width: u16, height: u16) -> Self {
		let mut data = BitVec::with_capacity(usize::from(width) * usize::from(height));
		data.resize(usize::from(width) * usize::from(height), false);

		Self {
			width,
			height,
			data,
		}
	}

	/// Threshold 8-bit greyscale pixels, row-major.
	///
	/// A pixel is lit if it is strictly brighter than `threshold`.
	///
	/// # Panics
	///
	/// Panics if `luma` is not exactly `width * height` long.
	pub fn from_luma(width: u16, height: u16, luma: &[u8], threshold: u8) -> Self {
		assert_eq!(
			luma.len(),
			usize::from(width) * usize::from(height),
			"luma buffer does not match dimensions"
		);

		Self {
			width,
			height,
			data: luma.iter().map(|&l| l > threshold).collect(),
		}
	}

	fn index(&self, x: u16, y: u16) -> usize {
		usize::from(y) * usize::from(self.width) + usize::from(x)
	}

	/// Set a pixel.
	///
	/// # Panics
	///
	/// Panics if the coordinates are out of bounds.
	pub fn set(&mut self, x: u16, y: u16, lit: bool) {
		assert!(x < self.width && y < self.height, "pixel out of bounds");
		let idx = self.index(x, y);
		self.data.set(idx, lit);
	}

	/// Get a pixel.
	///
	/// # Panics
	///
	/// Panics if the coordinates are out of bounds.
	pub fn get(&self, x: u16, y: u16) -> bool {
		assert!(x < self.width && y < self.height, "pixel out of bounds");
		self.data[self.index(x, y)]
	}

	/// Fill with a single value.
	pub fn fill(&mut self, lit: bool) {
		self.data.fill(lit);
	}

	/// Swap lit and dark pixels.
	pub fn invert(&mut self) {
		let data = std::mem::take(&mut self.data);
		self.data = !data;
	}

	/// How many pixels are lit.
	pub fn count_lit(&self) -> usize {
		self.data.count_ones()
	}

	/// Pack into the controller's page layout.
	///
	/// The output has one byte per column per page of 8 rows, pages in order, columns in order
	/// within a page. Within a byte, bit 0 is the top row of the page.
	///
	/// # Panics
	///
	/// Panics if the height is not a multiple of 8.
	pub fn pack(&self, orientation: Orientation) -> Vec<u8> {
		assert_eq!(self.height % 8, 0, "height must be a multiple of 8");

		let pages = self.height / 8;
		let mut out = Vec::with_capacity(usize::from(self.width) * usize::from(pages));
		for page in 0..pages {
			for x in 0..self.width {
				let mut byte = 0_u8;
				for bit in 0..8 {
					let row = page * 8 + bit;
					let y = match orientation {
						Orientation::Normal => self.height - 1 - row,
						Orientation::Flipped => row,
					};

					if self.get(x, y) {
						byte |= 1 << bit;
					}
				}
				out.push(byte);
			}
		}

		out
	}
}
