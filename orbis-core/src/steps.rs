/// Text notation for transform steps
///
/// ```text
/// translate(0, 2.05, 1.4) rotate(180 + 0.3t, 0, 0, 1); scale(1.12, 1.12, 1)
/// ```
///
/// Steps may be separated by whitespace or `;`. A rotation angle is a sum of
/// terms in degrees; a term suffixed with `t` is multiplied by the
/// animation clock.
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, multispace0, one_of},
    combinator::{all_consuming, map, opt, verify},
    multi::many0,
    number::complete::float,
    sequence::{delimited, pair, preceded, terminated, tuple},
    IResult,
};

use crate::error::{Error, Result};
use crate::transform::{Angle, Step};

/// Parse a step list, e.g. `"scale(2, 2, 2) rotate(0.6t, 0, 1, 0)"`
pub fn parse_steps(input: &str) -> Result<Vec<Step>> {
    let (_, steps) = all_consuming(terminated(many0(step_entry), multispace0))(input)
        .map_err(|e| Error::Parse(format!("{e:?}")))?;
    steps
        .into_iter()
        .collect::<Result<Vec<_>>>()
        .map_err(|e| Error::Parse(e.to_string()))
}

fn step_entry(input: &str) -> IResult<&str, Result<Step>> {
    terminated(step, opt(preceded(multispace0, char(';'))))(input)
}

fn step(input: &str) -> IResult<&str, Result<Step>> {
    preceded(
        multispace0,
        alt((
            map(call("translate", vector), |(x, y, z)| Ok(Step::translate(x, y, z))),
            map(call("scale", vector), |(x, y, z)| Ok(Step::scale(x, y, z))),
            map(
                call("rotate", pair(angle, preceded(comma, vector))),
                |(angle, (x, y, z))| Step::rotate_animated(angle, x, y, z),
            ),
        )),
    )(input)
}

/// `name ( args )` with free whitespace
fn call<'a, O>(
    name: &'static str,
    args: impl FnMut(&'a str) -> IResult<&'a str, O>,
) -> impl FnMut(&'a str) -> IResult<&'a str, O> {
    preceded(
        tag(name),
        delimited(
            preceded(multispace0, char('(')),
            args,
            preceded(multispace0, char(')')),
        ),
    )
}

/// A finite number; `float` alone would also accept `nan` and `inf`
fn number(input: &str) -> IResult<&str, f32> {
    preceded(multispace0, verify(float, |v: &f32| v.is_finite()))(input)
}

fn comma(input: &str) -> IResult<&str, char> {
    preceded(multispace0, char(','))(input)
}

fn vector(input: &str) -> IResult<&str, (f32, f32, f32)> {
    tuple((number, preceded(comma, number), preceded(comma, number)))(input)
}

/// A number in degrees, or degrees per tick when followed by `t`
fn term(input: &str) -> IResult<&str, Angle> {
    map(
        pair(number, opt(preceded(multispace0, char('t')))),
        |(value, clock)| match clock {
            Some(_) => Angle::animated(0.0, value),
            None => Angle::fixed(value),
        },
    )(input)
}

fn angle(input: &str) -> IResult<&str, Angle> {
    let (input, first) = term(input)?;
    let (input, rest) = many0(pair(preceded(multispace0, one_of("+-")), term))(input)?;

    let angle = rest.into_iter().fold(first, |acc, (sign, term)| {
        let sign = if sign == '-' { -1.0 } else { 1.0 };
        Angle::animated(acc.degrees + sign * term.degrees, acc.rate + sign * term.rate)
    });
    Ok((input, angle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::Transform;
    use nalgebra::Vector3;

    #[test]
    fn test_parse_translate_and_scale() {
        let steps = parse_steps("translate(0, 2.05, 1.4) scale(1.12,1.12,1)").unwrap();
        assert_eq!(
            steps,
            [
                Step::Translate(Vector3::new(0.0, 2.05, 1.4)),
                Step::Scale(Vector3::new(1.12, 1.12, 1.0)),
            ]
        );
    }

    #[test]
    fn test_parse_animated_rotation() {
        let steps = parse_steps("rotate(180 + 0.3t, 0, 0, 1)").unwrap();
        match &steps[..] {
            [Step::Rotate { angle, axis }] => {
                assert!((angle.degrees - 180.0).abs() < 1e-6);
                assert!((angle.rate - 0.3).abs() < 1e-6);
                assert!((axis.into_inner() - Vector3::z()).norm() < 1e-6);
            }
            other => panic!("unexpected steps {other:?}"),
        }
    }

    #[test]
    fn test_parse_signed_terms() {
        let steps = parse_steps("rotate(-3.5 - 0.1 t, 0, 1, 0)").unwrap();
        let Step::Rotate { angle, .. } = &steps[0] else {
            panic!("expected a rotation");
        };
        assert!((angle.degrees + 3.5).abs() < 1e-6);
        assert!((angle.rate + 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_parse_separators_and_whitespace() {
        let text = "\n  scale(10, 10, 10);\n  translate( 12 , 5 , -20 ) ;\n  rotate(-1t,0,1,0)\n";
        let steps = parse_steps(text).unwrap();
        assert_eq!(steps.len(), 3);

        let m = Transform::compose(&steps, 0.0);
        let center = m.transform_point(&nalgebra::Point3::origin());
        assert!((center.coords - Vector3::new(120.0, 50.0, -200.0)).norm() < 1e-3);
    }

    #[test]
    fn test_parse_empty() {
        assert!(parse_steps("").unwrap().is_empty());
        assert!(parse_steps("   ").unwrap().is_empty());
    }

    #[test]
    fn test_parse_errors() {
        for bad in [
            "translate(1, 2)",
            "spin(1, 0, 1, 0)",
            "scale(1, 2, 3",
            "rotate(45, 0, 0, 0)",
            "translate(1, 2, 3) garbage",
            "translate(nan, 0, 0)",
            "scale(1, inf, 1)",
            "rotate(inf, 0, 1, 0)",
            "rotate(10 + NaN t, 0, 1, 0)",
            "rotate(-infinity, 0, 1, 0)",
        ] {
            let err = parse_steps(bad).unwrap_err();
            assert_eq!(err.kind(), crate::error::ErrorKind::Parameter, "{bad:?}: {err}");
        }
    }
}
