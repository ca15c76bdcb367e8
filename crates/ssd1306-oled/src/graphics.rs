use std::convert::Infallible;

use embedded_graphics::{
	draw_target::DrawTarget,
	geometry::{OriginDimensions, Size},
	pixelcolor::BinaryColor,
	Pixel,
};

use crate::buffer::Bitmap;

impl OriginDimensions for Bitmap {
	fn size(&self) -> Size {
		Size::new(self.width.into(), self.height.into())
	}
}

impl DrawTarget for Bitmap {
	type Color = BinaryColor;
	type Error = Infallible;

	fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
	where
		I: IntoIterator<Item = Pixel<Self::Color>>,
	{
		for Pixel(coord, color) in pixels.into_iter() {
			let Ok(x) = u16::try_from(coord.x) else {
				continue;
			};
			let Ok(y) = u16::try_from(coord.y) else {
				continue;
			};

			if x >= self.width || y >= self.height {
				continue;
			}

			self.set(x, y, color.is_on());
		}

		Ok(())
	}

	fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
		self.fill(color.is_on());
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use embedded_graphics::{
		geometry::Point,
		prelude::*,
		primitives::{Line, PrimitiveStyle, Rectangle},
	};

	use super::*;

	#[test]
	fn draws_and_clips() {
		let mut bitmap = Bitmap::new(16, 8);
		Line::new(Point::new(-4, 2), Point::new(40, 2))
			.into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
			.draw(&mut bitmap)
			.unwrap();

		assert_eq!(bitmap.count_lit(), 16);
		assert!((0..16).all(|x| bitmap.get(x, 2)));
	}

	#[test]
	fn clear_fills() {
		let mut bitmap = Bitmap::new(16, 8);
		bitmap.clear(BinaryColor::On).unwrap();
		assert_eq!(bitmap.count_lit(), 128);

		Rectangle::new(Point::new(0, 0), Size::new(4, 4))
			.into_styled(PrimitiveStyle::with_fill(BinaryColor::Off))
			.draw(&mut bitmap)
			.unwrap();
		assert_eq!(bitmap.count_lit(), 112);
	}

	#[test]
	fn reports_size() {
		assert_eq!(Bitmap::new(128, 64).size(), Size::new(128, 64));
	}
}
